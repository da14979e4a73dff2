//! Recycle bin value objects.

pub mod model;

pub use model::TrashedItem;
