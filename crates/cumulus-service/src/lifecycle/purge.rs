//! Permanent deletion and the delete dispatcher.

use futures::FutureExt;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;
use cumulus_core::types::{FolderId, LifecycleFilter};
use cumulus_database::store::{FileQuery, FolderQuery, WriteBatch};
use cumulus_entity::file::File;
use cumulus_entity::folder::Folder;
use cumulus_entity::item::{EntityState, Item, ItemRef};

use super::{BlobFailure, LifecycleService, PurgeMode, PurgeReport};
use crate::context::RequestContext;
use crate::folder::engine::FolderIndex;

/// Result of [`LifecycleService::delete`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The item was moved to the recycle bin.
    Trashed(Item),
    /// The item was removed permanently.
    Purged(PurgeReport),
}

impl LifecycleService {
    /// Soft-delete, or purge when `permanent` is set.
    ///
    /// `force` only matters for a permanent delete of an ACTIVE item.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        item: ItemRef,
        permanent: bool,
        force: bool,
    ) -> AppResult<DeleteOutcome> {
        if !permanent {
            return self
                .soft_delete(ctx, item)
                .await
                .map(DeleteOutcome::Trashed);
        }
        let mode = if force {
            PurgeMode::Force
        } else {
            PurgeMode::TrashedOnly
        };
        self.purge(ctx, item, mode).await.map(DeleteOutcome::Purged)
    }

    /// Remove an item and its closure for good.
    ///
    /// For a TRASHED folder the closure is everything trashed by the same
    /// cascade beneath it; for an ACTIVE folder (only with
    /// [`PurgeMode::Force`]) it is the live subtree. Rows go in one batch,
    /// then the blobs are deleted. Blob failures are reported, not raised.
    pub async fn purge(
        &self,
        ctx: &RequestContext,
        item: ItemRef,
        mode: PurgeMode,
    ) -> AppResult<PurgeReport> {
        let current = self.load_item(ctx, item).await?;
        if current.state() == EntityState::Active && mode != PurgeMode::Force {
            return Err(AppError::stale_state(format!(
                "The {} must be in the recycle bin before it can be deleted permanently",
                item.item_type()
            )));
        }

        let (folders, files) = match current {
            Item::File(file) => (Vec::new(), vec![file]),
            Item::Folder(folder) => self.purge_closure(ctx, folder).await?,
        };
        let report = self.purge_rows(ctx, folders, files).await?;

        info!(
            user_id = %ctx.user_id,
            item = %item,
            folders = report.folders_purged,
            files = report.files_purged,
            blob_failures = report.blob_failures.len(),
            "Item purged"
        );
        Ok(report)
    }

    /// Purge every TRASHED row of the caller.
    pub async fn empty_recycle_bin(&self, ctx: &RequestContext) -> AppResult<PurgeReport> {
        let folders = self
            .records
            .list_folders(ctx.user_id, FolderQuery::trashed())
            .await?;
        let files = self
            .records
            .list_files(ctx.user_id, FileQuery::trashed())
            .await?;
        let report = self.purge_rows(ctx, folders, files).await?;

        info!(
            user_id = %ctx.user_id,
            folders = report.folders_purged,
            files = report.files_purged,
            blob_failures = report.blob_failures.len(),
            "Recycle bin emptied"
        );
        Ok(report)
    }

    /// Folders (parents first, `root` included) and files to purge with `root`.
    async fn purge_closure(
        &self,
        ctx: &RequestContext,
        root: Folder,
    ) -> AppResult<(Vec<Folder>, Vec<File>)> {
        let (snapshot, file_query) = match root.deleted_at {
            None => (self.active_folders(ctx).await?, None),
            Some(deleted_at) => {
                let group = self
                    .records
                    .list_folders(
                        ctx.user_id,
                        FolderQuery {
                            lifecycle: LifecycleFilter::Trashed,
                            deleted_at: Some(deleted_at),
                            ..FolderQuery::default()
                        },
                    )
                    .await?;
                (group, Some(deleted_at))
            }
        };
        let index = match file_query {
            None => FolderIndex::new(&snapshot),
            Some(_) => FolderIndex::by_original_parent(&snapshot),
        };

        let root_id = root.id;
        let mut folders = Vec::with_capacity(index.len() + 1);
        folders.push(root);
        folders.extend(index.descendants(root_id).into_iter().cloned());
        let ids: Vec<FolderId> = folders.iter().map(|f| f.id).collect();

        let query = match file_query {
            None => FileQuery::in_folders(ids),
            Some(deleted_at) => FileQuery::trashed_from(ids, deleted_at),
        };
        let files = self.records.list_files(ctx.user_id, query).await?;
        Ok((folders, files))
    }

    /// Delete the rows in one batch, then their blobs.
    ///
    /// `folders` must list parents before children; they are removed in
    /// reverse so the deepest go first.
    async fn purge_rows(
        &self,
        ctx: &RequestContext,
        folders: Vec<Folder>,
        files: Vec<File>,
    ) -> AppResult<PurgeReport> {
        let mut batch = WriteBatch::new(ctx.user_id, ctx.request_time);
        for file in &files {
            batch.delete_file(file.id);
        }
        for folder in folders.iter().rev() {
            batch.delete_folder(folder.id);
        }
        self.records.apply(batch).await?;

        let blob_failures = self.delete_blobs(&files).await;
        Ok(PurgeReport {
            folders_purged: folders.len(),
            files_purged: files.len(),
            blob_failures,
        })
    }

    /// Delete the blobs of purged files concurrently. Never fails.
    async fn delete_blobs(&self, files: &[File]) -> Vec<BlobFailure> {
        let blobs = &self.blobs;
        let mut failures: Vec<BlobFailure> = stream::iter(files)
            .map(|file| {
                async move {
                    blobs.delete(&file.blob_ref).await.err().map(|e| {
                        warn!(
                            file_id = %file.id,
                            blob = %file.blob_ref,
                            error = %e,
                            "Failed to delete blob of purged file"
                        );
                        BlobFailure {
                            file_id: file.id,
                            blob_ref: file.blob_ref.clone(),
                            message: e.message,
                        }
                    })
                }
                .boxed()
            })
            .buffer_unordered(self.concurrency())
            .filter_map(|failure| async move { failure })
            .boxed()
            .collect()
            .await;
        failures.sort_by_key(|f| f.file_id.0);
        failures
    }
}
