//! Recycle bin listing and the restore/purge actions offered from it.

pub mod service;

pub use service::RecycleBinService;
