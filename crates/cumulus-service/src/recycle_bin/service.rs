//! Recycle bin view over TRASHED files and folders.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use cumulus_core::result::AppResult;
use cumulus_core::types::{FolderId, TrashSortKey};
use cumulus_database::store::{FileQuery, FolderQuery, RecordStore};
use cumulus_entity::item::{Item, ItemRef, ItemType};
use cumulus_entity::trash::TrashedItem;

use crate::context::RequestContext;
use crate::folder::engine::FolderIndex;
use crate::lifecycle::{LifecycleService, PurgeMode, PurgeReport, RestoreMode};

/// Lists trashed items and forwards restore/purge to the lifecycle manager.
#[derive(Debug, Clone)]
pub struct RecycleBinService {
    records: Arc<dyn RecordStore>,
    lifecycle: Arc<LifecycleService>,
}

impl RecycleBinService {
    /// Creates a new recycle bin service.
    pub fn new(records: Arc<dyn RecordStore>, lifecycle: Arc<LifecycleService>) -> Self {
        Self { records, lifecycle }
    }

    /// Every TRASHED item of the caller, ordered by `sort`.
    ///
    /// The original location is rendered against the ACTIVE folders only: a
    /// location that is gone or itself trashed shows as the root label.
    pub async fn list_trashed(
        &self,
        ctx: &RequestContext,
        sort: TrashSortKey,
    ) -> AppResult<Vec<TrashedItem>> {
        let active = self
            .records
            .list_folders(ctx.user_id, FolderQuery::active())
            .await?;
        let folders = self
            .records
            .list_folders(ctx.user_id, FolderQuery::trashed())
            .await?;
        let files = self
            .records
            .list_files(ctx.user_id, FileQuery::trashed())
            .await?;

        let index = FolderIndex::new(&active);
        let root_label = &self.lifecycle.config().root_label;
        let location = |original: Option<FolderId>| -> String {
            let Some(id) = original.filter(|id| index.contains(*id)) else {
                return root_label.clone();
            };
            let mut path = root_label.clone();
            for crumb in index.breadcrumbs(id) {
                path.push('/');
                path.push_str(&crumb.name);
            }
            path
        };

        let mut items = Vec::with_capacity(folders.len() + files.len());
        for folder in folders {
            let Some(deleted_at) = folder.deleted_at else {
                continue;
            };
            items.push(TrashedItem {
                id: folder.id.into_uuid(),
                original_location_path: location(folder.original_parent_id),
                original_location_id: folder.original_parent_id,
                name: folder.name,
                item_type: ItemType::Folder,
                size: None,
                deleted_at,
            });
        }
        for file in files {
            let Some(deleted_at) = file.deleted_at else {
                continue;
            };
            items.push(TrashedItem {
                id: file.id.into_uuid(),
                original_location_path: location(file.original_folder_id),
                original_location_id: file.original_folder_id,
                name: file.name,
                item_type: ItemType::File,
                size: Some(file.size_bytes),
                deleted_at,
            });
        }

        sort_items(&mut items, sort);
        debug!(user_id = %ctx.user_id, count = items.len(), ?sort, "Listed recycle bin");
        Ok(items)
    }

    /// Restore one trashed item.
    pub async fn restore(
        &self,
        ctx: &RequestContext,
        item: ItemRef,
        mode: RestoreMode,
    ) -> AppResult<Item> {
        self.lifecycle.restore(ctx, item, mode).await
    }

    /// Permanently delete one trashed item.
    pub async fn purge(&self, ctx: &RequestContext, item: ItemRef) -> AppResult<PurgeReport> {
        self.lifecycle.purge(ctx, item, PurgeMode::TrashedOnly).await
    }

    /// Permanently delete everything in the recycle bin.
    pub async fn empty(&self, ctx: &RequestContext) -> AppResult<PurgeReport> {
        self.lifecycle.empty_recycle_bin(ctx).await
    }
}

/// Order by `key`, breaking ties by id.
fn sort_items(items: &mut [TrashedItem], key: TrashSortKey) {
    items.sort_by(|a, b| {
        let primary = match key {
            TrashSortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            TrashSortKey::DeletedAt => b.deleted_at.cmp(&a.deleted_at),
            TrashSortKey::Size => match (a.size, b.size) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            TrashSortKey::Location => a.original_location_path.cmp(&b.original_location_path),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    });
}
