//! Lifecycle manager: create, rename, move, copy, soft-delete, restore and
//! purge for files and folders, including the folder cascades.
//!
//! Every operation validates against a snapshot first and then commits one
//! [`WriteBatch`](cumulus_database::WriteBatch), so validation failures never leave side effects and a
//! cascade is either fully applied or not at all.
//!
//! ```text
//! ACTIVE ──soft_delete──▶ TRASHED ──purge──▶ PURGED
//!    ▲                       │
//!    └───────restore─────────┘
//! ACTIVE ──purge(Force)──▶ PURGED
//! ```

pub mod copy;
pub mod edit;
pub mod file;
pub mod folder;
pub mod naming;
pub mod purge;
pub mod trash;

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use cumulus_core::config::LifecycleConfig;
use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;
use cumulus_core::traits::BlobStore;
use cumulus_core::types::{BlobRef, FileId, FolderId};
use cumulus_database::store::{FileQuery, FolderQuery, RecordStore};
use cumulus_entity::file::File;
use cumulus_entity::folder::Folder;
use cumulus_entity::item::{EntityState, Item, ItemRef, ItemType};

use crate::context::RequestContext;

/// How far a folder restore reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreMode {
    /// Restore only the named item; its trashed children stay in the bin.
    #[default]
    Single,
    /// Also restore everything trashed by the same cascade beneath it.
    Subtree,
}

/// Whether a purge may skip the recycle bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurgeMode {
    /// Only TRASHED items may be purged.
    #[default]
    TrashedOnly,
    /// Explicit override: ACTIVE items may be purged directly.
    Force,
}

/// A blob whose delete failed during a purge. The row is gone regardless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobFailure {
    /// The purged file.
    pub file_id: FileId,
    /// The orphaned blob.
    pub blob_ref: BlobRef,
    /// Why the delete failed.
    pub message: String,
}

/// Summary of a purge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurgeReport {
    /// Folder rows removed.
    pub folders_purged: usize,
    /// File rows removed.
    pub files_purged: usize,
    /// Blobs left behind.
    pub blob_failures: Vec<BlobFailure>,
}

impl PurgeReport {
    /// Whether every blob delete succeeded.
    pub fn is_clean(&self) -> bool {
        self.blob_failures.is_empty()
    }
}

/// Create/rename/move/copy/delete/restore/purge for files and folders.
#[derive(Debug, Clone)]
pub struct LifecycleService {
    /// Folder and file rows.
    records: Arc<dyn RecordStore>,
    /// File bytes.
    blobs: Arc<dyn BlobStore>,
    /// Limits and labels.
    config: LifecycleConfig,
}

impl LifecycleService {
    /// Creates a new lifecycle service.
    pub fn new(
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            records,
            blobs,
            config,
        }
    }

    /// The tuning this service runs with.
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    fn concurrency(&self) -> usize {
        self.config.blob_concurrency.max(1)
    }

    async fn load_folder(&self, ctx: &RequestContext, id: FolderId) -> AppResult<Folder> {
        self.records
            .find_folder(ctx.user_id, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    async fn load_file(&self, ctx: &RequestContext, id: FileId) -> AppResult<File> {
        self.records
            .find_file(ctx.user_id, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    async fn load_item(&self, ctx: &RequestContext, item: ItemRef) -> AppResult<Item> {
        Ok(match item {
            ItemRef::File(id) => Item::File(self.load_file(ctx, id).await?),
            ItemRef::Folder(id) => Item::Folder(self.load_folder(ctx, id).await?),
        })
    }

    /// Every ACTIVE folder of the caller.
    async fn active_folders(&self, ctx: &RequestContext) -> AppResult<Vec<Folder>> {
        self.records
            .list_folders(ctx.user_id, FolderQuery::active())
            .await
    }

    /// Resolve a container for new content: root, or an ACTIVE folder.
    async fn require_container(
        &self,
        ctx: &RequestContext,
        folder_id: Option<FolderId>,
    ) -> AppResult<()> {
        let Some(id) = folder_id else {
            return Ok(());
        };
        match self.records.find_folder(ctx.user_id, id).await? {
            Some(folder) if folder.is_active() => Ok(()),
            _ => Err(AppError::not_found(format!("Folder {id} not found"))),
        }
    }

    /// Names of the ACTIVE siblings of the given kind under `parent`.
    async fn sibling_names(
        &self,
        ctx: &RequestContext,
        item_type: ItemType,
        parent: Option<FolderId>,
    ) -> AppResult<HashSet<String>> {
        let names = match item_type {
            ItemType::Folder => self
                .records
                .list_folders(ctx.user_id, FolderQuery::children_of(parent))
                .await?
                .into_iter()
                .map(|f| f.name)
                .collect(),
            ItemType::File => self
                .records
                .list_files(ctx.user_id, FileQuery::in_folder(parent))
                .await?
                .into_iter()
                .map(|f| f.name)
                .collect(),
        };
        Ok(names)
    }

    /// Fail with `Conflict` if an ACTIVE sibling already uses `name`.
    async fn ensure_name_free(
        &self,
        ctx: &RequestContext,
        item_type: ItemType,
        parent: Option<FolderId>,
        name: &str,
    ) -> AppResult<()> {
        let taken = match item_type {
            ItemType::Folder => !self
                .records
                .list_folders(ctx.user_id, FolderQuery::children_of(parent).named(name))
                .await?
                .is_empty(),
            ItemType::File => !self
                .records
                .list_files(ctx.user_id, FileQuery::in_folder(parent).named(name))
                .await?
                .is_empty(),
        };
        if taken {
            return Err(AppError::conflict(format!(
                "A {item_type} named '{name}' already exists in this location"
            )));
        }
        Ok(())
    }
}

/// Reject an operation that needs a different lifecycle state.
fn require_state(
    item_type: ItemType,
    actual: EntityState,
    expected: EntityState,
) -> AppResult<()> {
    if actual == expected {
        return Ok(());
    }
    Err(match expected {
        EntityState::Active => {
            AppError::stale_state(format!("The {item_type} is in the recycle bin"))
        }
        EntityState::Trashed => {
            AppError::stale_state(format!("The {item_type} is not in the recycle bin"))
        }
    })
}
