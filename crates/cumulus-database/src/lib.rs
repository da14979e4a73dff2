//! # cumulus-database
//!
//! The [`RecordStore`] contract plus its PostgreSQL and in-memory
//! implementations, connection management, and migrations.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;
pub use store::{FileQuery, FolderQuery, RecordStore, RecordWrite, WriteBatch};
