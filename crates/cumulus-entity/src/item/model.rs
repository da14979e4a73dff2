//! Addressing a file or a folder through one operation surface.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cumulus_core::AppError;
use cumulus_core::types::{FileId, FolderId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::file::File;
use crate::folder::Folder;

/// Discriminates files from folders on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// A file.
    File,
    /// A folder.
    Folder,
}

impl ItemType {
    /// Lowercase string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "folder" => Ok(Self::Folder),
            other => Err(AppError::invalid_argument(format!(
                "Unknown item type '{other}'"
            ))),
        }
    }
}

/// A typed reference to a single file or folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRef {
    /// A file id.
    File(FileId),
    /// A folder id.
    Folder(FolderId),
}

impl ItemRef {
    /// Build a reference from an untyped id.
    pub fn new(item_type: ItemType, id: Uuid) -> Self {
        match item_type {
            ItemType::File => Self::File(FileId::from_uuid(id)),
            ItemType::Folder => Self::Folder(FolderId::from_uuid(id)),
        }
    }

    /// The kind of item referenced.
    pub fn item_type(&self) -> ItemType {
        match self {
            Self::File(_) => ItemType::File,
            Self::Folder(_) => ItemType::Folder,
        }
    }

    /// The raw id.
    pub fn uuid(&self) -> Uuid {
        match self {
            Self::File(id) => id.into_uuid(),
            Self::Folder(id) => id.into_uuid(),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.item_type(), self.uuid())
    }
}

/// A loaded file or folder row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Item {
    /// A file row.
    File(File),
    /// A folder row.
    Folder(Folder),
}

impl Item {
    /// Reference to this row.
    pub fn item_ref(&self) -> ItemRef {
        match self {
            Self::File(file) => ItemRef::File(file.id),
            Self::Folder(folder) => ItemRef::Folder(folder.id),
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            Self::File(file) => &file.name,
            Self::Folder(folder) => &folder.name,
        }
    }

    /// Lifecycle state.
    pub fn state(&self) -> EntityState {
        match self {
            Self::File(file) => file.state(),
            Self::Folder(folder) => folder.state(),
        }
    }
}

/// Lifecycle state of a row that still exists.
///
/// `PURGED` has no variant: a purged item has no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityState {
    /// Visible in normal listings.
    Active,
    /// In the recycle bin.
    Trashed,
}

impl EntityState {
    /// Derive the state from a soft-delete marker.
    pub fn from_deleted_at(deleted_at: Option<&DateTime<Utc>>) -> Self {
        if deleted_at.is_some() {
            Self::Trashed
        } else {
            Self::Active
        }
    }
}
