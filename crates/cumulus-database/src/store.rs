//! The record store contract shared by every persistence backend.
//!
//! Reads are owner-scoped queries. Writes are collected into a
//! [`WriteBatch`] that the backend applies atomically, so a cascade over a
//! folder subtree is either fully visible or not at all.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use cumulus_core::result::AppResult;
use cumulus_core::types::{FileId, FolderId, LifecycleFilter, ParentFilter, UserId};
use cumulus_entity::file::{File, FilePatch};
use cumulus_entity::folder::{Folder, FolderPatch};

/// Query over one owner's folders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderQuery {
    /// Constraint on the live `parent_id`.
    pub parent: ParentFilter<FolderId>,
    /// Constraint on `deleted_at` presence.
    pub lifecycle: LifecycleFilter,
    /// Exact name.
    pub name: Option<String>,
    /// Exact `deleted_at`.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl FolderQuery {
    /// Every ACTIVE folder.
    pub fn active() -> Self {
        Self::default()
    }

    /// Every TRASHED folder.
    pub fn trashed() -> Self {
        Self {
            lifecycle: LifecycleFilter::Trashed,
            ..Self::default()
        }
    }

    /// ACTIVE folders directly under `parent` (root when `None`).
    pub fn children_of(parent: Option<FolderId>) -> Self {
        Self {
            parent: ParentFilter::from_option(parent),
            ..Self::default()
        }
    }

    /// Restrict to an exact name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether a row satisfies the query.
    pub fn matches(&self, folder: &Folder) -> bool {
        self.parent.matches(folder.parent_id.as_ref())
            && self.lifecycle.matches(folder.deleted_at.is_some())
            && self.name.as_ref().is_none_or(|name| *name == folder.name)
            && self
                .deleted_at
                .is_none_or(|at| folder.deleted_at == Some(at))
    }
}

/// Query over one owner's files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileQuery {
    /// Constraint on the live `folder_id`.
    pub folder: ParentFilter<FolderId>,
    /// Constraint on `original_folder_id`.
    pub original_folder: ParentFilter<FolderId>,
    /// Constraint on `deleted_at` presence.
    pub lifecycle: LifecycleFilter,
    /// Exact name.
    pub name: Option<String>,
    /// Exact `deleted_at`.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl FileQuery {
    /// Every ACTIVE file.
    pub fn active() -> Self {
        Self::default()
    }

    /// Every TRASHED file.
    pub fn trashed() -> Self {
        Self {
            lifecycle: LifecycleFilter::Trashed,
            ..Self::default()
        }
    }

    /// ACTIVE files directly inside `folder` (root when `None`).
    pub fn in_folder(folder: Option<FolderId>) -> Self {
        Self {
            folder: ParentFilter::from_option(folder),
            ..Self::default()
        }
    }

    /// ACTIVE files directly inside any of `folders`.
    pub fn in_folders(folders: Vec<FolderId>) -> Self {
        Self {
            folder: ParentFilter::In(folders),
            ..Self::default()
        }
    }

    /// TRASHED files stamped at `deleted_at` that lived in any of `folders`.
    pub fn trashed_from(folders: Vec<FolderId>, deleted_at: DateTime<Utc>) -> Self {
        Self {
            original_folder: ParentFilter::In(folders),
            lifecycle: LifecycleFilter::Trashed,
            deleted_at: Some(deleted_at),
            ..Self::default()
        }
    }

    /// Restrict to an exact name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether a row satisfies the query.
    pub fn matches(&self, file: &File) -> bool {
        self.folder.matches(file.folder_id.as_ref())
            && self.original_folder.matches(file.original_folder_id.as_ref())
            && self.lifecycle.matches(file.deleted_at.is_some())
            && self.name.as_ref().is_none_or(|name| *name == file.name)
            && self.deleted_at.is_none_or(|at| file.deleted_at == Some(at))
    }
}

/// A single row mutation inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordWrite {
    /// Insert a new folder row.
    InsertFolder(Folder),
    /// Insert a new file row.
    InsertFile(File),
    /// Partially update a folder row.
    UpdateFolder {
        /// Target row.
        id: FolderId,
        /// Columns to change.
        patch: FolderPatch,
        /// Reject the batch unless the row still has this `updated_at`.
        expected_updated_at: Option<DateTime<Utc>>,
    },
    /// Partially update a file row.
    UpdateFile {
        /// Target row.
        id: FileId,
        /// Columns to change.
        patch: FilePatch,
        /// Reject the batch unless the row still has this `updated_at`.
        expected_updated_at: Option<DateTime<Utc>>,
    },
    /// Hard-delete a folder row.
    DeleteFolder(FolderId),
    /// Hard-delete a file row.
    DeleteFile(FileId),
}

/// An ordered set of writes for one owner, applied all-or-nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteBatch {
    owner: UserId,
    now: DateTime<Utc>,
    writes: Vec<RecordWrite>,
}

impl WriteBatch {
    /// Start an empty batch. `now` becomes the `updated_at` of every
    /// updated row.
    pub fn new(owner: UserId, now: DateTime<Utc>) -> Self {
        Self {
            owner,
            now,
            writes: Vec::new(),
        }
    }

    /// Owner every write is scoped to.
    pub fn owner(&self) -> UserId {
        self.owner
    }

    /// Timestamp written to `updated_at`.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// The queued writes, in application order.
    pub fn writes(&self) -> &[RecordWrite] {
        &self.writes
    }

    /// Consume the batch.
    pub fn into_writes(self) -> Vec<RecordWrite> {
        self.writes
    }

    /// Number of queued writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Queue a folder insert.
    pub fn insert_folder(&mut self, folder: Folder) -> &mut Self {
        self.writes.push(RecordWrite::InsertFolder(folder));
        self
    }

    /// Queue a file insert.
    pub fn insert_file(&mut self, file: File) -> &mut Self {
        self.writes.push(RecordWrite::InsertFile(file));
        self
    }

    /// Queue an unconditional folder update.
    pub fn update_folder(&mut self, id: FolderId, patch: FolderPatch) -> &mut Self {
        self.writes.push(RecordWrite::UpdateFolder {
            id,
            patch,
            expected_updated_at: None,
        });
        self
    }

    /// Queue a folder update guarded by the row's last seen `updated_at`.
    pub fn update_folder_checked(
        &mut self,
        folder: &Folder,
        patch: FolderPatch,
    ) -> &mut Self {
        self.writes.push(RecordWrite::UpdateFolder {
            id: folder.id,
            patch,
            expected_updated_at: Some(folder.updated_at),
        });
        self
    }

    /// Queue an unconditional file update.
    pub fn update_file(&mut self, id: FileId, patch: FilePatch) -> &mut Self {
        self.writes.push(RecordWrite::UpdateFile {
            id,
            patch,
            expected_updated_at: None,
        });
        self
    }

    /// Queue a file update guarded by the row's last seen `updated_at`.
    pub fn update_file_checked(&mut self, file: &File, patch: FilePatch) -> &mut Self {
        self.writes.push(RecordWrite::UpdateFile {
            id: file.id,
            patch,
            expected_updated_at: Some(file.updated_at),
        });
        self
    }

    /// Queue a folder delete.
    pub fn delete_folder(&mut self, id: FolderId) -> &mut Self {
        self.writes.push(RecordWrite::DeleteFolder(id));
        self
    }

    /// Queue a file delete.
    pub fn delete_file(&mut self, id: FileId) -> &mut Self {
        self.writes.push(RecordWrite::DeleteFile(id));
        self
    }
}

/// Persistence for the `folders` and `files` tables.
///
/// Every read and write is scoped to one owner; rows of other owners are
/// invisible. [`RecordStore::apply`] must be atomic: either the whole batch
/// is visible afterwards or none of it is. A backend that cannot roll back
/// must report an interrupted batch as `PartialFailure`, never as success.
///
/// Batch rejections:
/// * an update guarded by `expected_updated_at` that no longer matches, or
///   an update/delete whose row is gone: `StaleState`;
/// * a live reference to a folder that does not exist: `StaleState`;
/// * two ACTIVE siblings with the same name: `Conflict`.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug + 'static {
    /// Backend name for diagnostics (e.g., "postgres", "memory").
    fn backend(&self) -> &str;

    /// Check whether the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Release backend resources once the server has stopped.
    async fn close(&self) {}

    /// Fetch a folder by id.
    async fn find_folder(&self, owner: UserId, id: FolderId) -> AppResult<Option<Folder>>;

    /// Fetch a file by id.
    async fn find_file(&self, owner: UserId, id: FileId) -> AppResult<Option<File>>;

    /// List folders, ordered by name then id.
    async fn list_folders(&self, owner: UserId, query: FolderQuery) -> AppResult<Vec<Folder>>;

    /// List files, ordered by name then id.
    async fn list_files(&self, owner: UserId, query: FileQuery) -> AppResult<Vec<File>>;

    /// Apply a batch atomically. Returns the number of rows written.
    async fn apply(&self, batch: WriteBatch) -> AppResult<usize>;
}
