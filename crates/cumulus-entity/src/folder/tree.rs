//! Folder tree structures for hierarchical display.

use cumulus_core::types::FolderId;
use serde::{Deserialize, Serialize};

use super::model::Folder;

/// A node in a folder tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNode {
    /// The folder at this node.
    #[serde(flatten)]
    pub folder: Folder,
    /// Child folder nodes, in input order.
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Number of folders in this subtree, including this one.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(FolderNode::size).sum::<usize>()
    }
}

/// One step of a root-first navigation path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Folder ID.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
}
