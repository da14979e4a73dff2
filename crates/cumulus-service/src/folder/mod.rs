//! Folder hierarchy: the pure tree engine and the tree queries built on it.

pub mod engine;
pub mod tree;

pub use engine::{FolderIndex, MoveSubject, TargetRejection};
pub use tree::TreeService;
