//! File entity model.

use chrono::{DateTime, Utc};
use cumulus_core::types::{BlobRef, FileId, FolderId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::item::EntityState;

/// A file stored in Cumulus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: FileId,
    /// The file name (including extension).
    pub name: String,
    /// MIME type of the file.
    pub mime_type: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Where the bytes live in the blob store.
    pub blob_ref: BlobRef,
    /// The file owner. Immutable after creation.
    pub owner_id: UserId,
    /// The folder containing this file (null for root and for trashed files).
    pub folder_id: Option<FolderId>,
    /// Set while the file is in the recycle bin.
    pub deleted_at: Option<DateTime<Utc>>,
    /// The `folder_id` the file had when it was soft-deleted.
    pub original_folder_id: Option<FolderId>,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Lifecycle state derived from `deleted_at`.
    pub fn state(&self) -> EntityState {
        EntityState::from_deleted_at(self.deleted_at.as_ref())
    }

    /// Whether the file is visible in normal listings.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }
}

/// A partial update to a file row.
///
/// Same conventions as [`crate::folder::FolderPatch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilePatch {
    /// New name.
    pub name: Option<String>,
    /// New live folder.
    pub folder_id: Option<Option<FolderId>>,
    /// New soft-delete marker.
    pub deleted_at: Option<Option<DateTime<Utc>>>,
    /// New restore location marker.
    pub original_folder_id: Option<Option<FolderId>>,
}

impl FilePatch {
    /// Change only the name.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Change only the live folder.
    pub fn relocate(folder_id: Option<FolderId>) -> Self {
        Self {
            folder_id: Some(folder_id),
            ..Self::default()
        }
    }

    /// Move into the recycle bin, remembering where the file lived.
    pub fn trash(deleted_at: DateTime<Utc>, original_folder_id: Option<FolderId>) -> Self {
        Self {
            name: None,
            folder_id: Some(None),
            deleted_at: Some(Some(deleted_at)),
            original_folder_id: Some(original_folder_id),
        }
    }

    /// Leave the recycle bin into `folder_id`.
    pub fn restore(folder_id: Option<FolderId>) -> Self {
        Self {
            name: None,
            folder_id: Some(folder_id),
            deleted_at: Some(None),
            original_folder_id: Some(None),
        }
    }

    /// Also change the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Write the patch into a row.
    pub fn apply_to(&self, file: &mut File, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            file.name.clone_from(name);
        }
        if let Some(folder_id) = self.folder_id {
            file.folder_id = folder_id;
        }
        if let Some(deleted_at) = self.deleted_at {
            file.deleted_at = deleted_at;
        }
        if let Some(original) = self.original_folder_id {
            file.original_folder_id = original;
        }
        file.updated_at = now;
    }
}
