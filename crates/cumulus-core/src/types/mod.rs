//! Core type definitions used across the Cumulus workspace.

pub mod blob_ref;
pub mod filter;
pub mod id;
pub mod sorting;

pub use blob_ref::BlobRef;
pub use filter::{LifecycleFilter, ParentFilter};
pub use id::*;
pub use sorting::{SortDirection, TrashSortKey};
