//! Core traits defined in `cumulus-core` and implemented by other crates.

pub mod blob;

pub use blob::BlobStore;
