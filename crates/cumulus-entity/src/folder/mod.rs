//! Folder domain entities.

pub mod model;
pub mod tree;

pub use model::{Folder, FolderPatch};
pub use tree::{Breadcrumb, FolderNode};
