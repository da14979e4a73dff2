//! # cumulus-storage
//!
//! Blob store implementations for Cumulus: the local filesystem for real
//! deployments and process memory for tests.

pub mod mime;
pub mod providers;

pub use mime::mime_from_path;
pub use providers::{LocalBlobStore, MemoryBlobStore};
