//! Folder entity model.

use chrono::{DateTime, Utc};
use cumulus_core::types::{FolderId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::item::EntityState;

/// A folder in the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// The folder owner. Immutable after creation.
    pub owner_id: UserId,
    /// Parent folder ID (null for root folders and for trashed folders).
    pub parent_id: Option<FolderId>,
    /// Set while the folder is in the recycle bin.
    pub deleted_at: Option<DateTime<Utc>>,
    /// The `parent_id` the folder had when it was soft-deleted.
    pub original_parent_id: Option<FolderId>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Create a new, active folder.
    pub fn new(
        owner_id: UserId,
        name: impl Into<String>,
        parent_id: Option<FolderId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: FolderId::new(),
            name: name.into(),
            owner_id,
            parent_id,
            deleted_at: None,
            original_parent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Lifecycle state derived from `deleted_at`.
    pub fn state(&self) -> EntityState {
        EntityState::from_deleted_at(self.deleted_at.as_ref())
    }

    /// Whether the folder is visible in normal listings.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A partial update to a folder row.
///
/// `None` leaves the column untouched. The nullable columns use
/// `Some(None)` to write NULL. Applying any patch refreshes `updated_at`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderPatch {
    /// New name.
    pub name: Option<String>,
    /// New live parent.
    pub parent_id: Option<Option<FolderId>>,
    /// New soft-delete marker.
    pub deleted_at: Option<Option<DateTime<Utc>>>,
    /// New restore location marker.
    pub original_parent_id: Option<Option<FolderId>>,
}

impl FolderPatch {
    /// Change only the name.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Change only the live parent.
    pub fn reparent(parent_id: Option<FolderId>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    /// Move into the recycle bin, remembering where the folder lived.
    pub fn trash(deleted_at: DateTime<Utc>, original_parent_id: Option<FolderId>) -> Self {
        Self {
            name: None,
            parent_id: Some(None),
            deleted_at: Some(Some(deleted_at)),
            original_parent_id: Some(original_parent_id),
        }
    }

    /// Leave the recycle bin under `parent_id`.
    pub fn restore(parent_id: Option<FolderId>) -> Self {
        Self {
            name: None,
            parent_id: Some(parent_id),
            deleted_at: Some(None),
            original_parent_id: Some(None),
        }
    }

    /// Also change the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Write the patch into a row.
    pub fn apply_to(&self, folder: &mut Folder, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            folder.name.clone_from(name);
        }
        if let Some(parent_id) = self.parent_id {
            folder.parent_id = parent_id;
        }
        if let Some(deleted_at) = self.deleted_at {
            folder.deleted_at = deleted_at;
        }
        if let Some(original) = self.original_parent_id {
            folder.original_parent_id = original;
        }
        folder.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trash_then_restore_patch() {
        let owner = UserId::new();
        let parent = FolderId::new();
        let now = Utc::now();
        let mut folder = Folder::new(owner, "Reports", Some(parent), now);

        FolderPatch::trash(now, folder.parent_id).apply_to(&mut folder, now);
        assert_eq!(folder.state(), EntityState::Trashed);
        assert_eq!(folder.parent_id, None);
        assert_eq!(folder.original_parent_id, Some(parent));

        FolderPatch::restore(None).apply_to(&mut folder, now);
        assert!(folder.is_active());
        assert_eq!(folder.parent_id, None);
        assert_eq!(folder.original_parent_id, None);
    }

    #[test]
    fn test_empty_patch_only_touches_updated_at() {
        let now = Utc::now();
        let mut folder = Folder::new(UserId::new(), "Docs", None, now);
        let before = folder.clone();
        let later = now + chrono::Duration::seconds(5);
        FolderPatch::default().apply_to(&mut folder, later);
        assert_eq!(folder.name, before.name);
        assert_eq!(folder.updated_at, later);
    }
}
