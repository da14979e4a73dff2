//! Folder tree and breadcrumb queries.

use std::sync::Arc;

use tracing::warn;

use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;
use cumulus_core::types::FolderId;
use cumulus_database::store::{FolderQuery, RecordStore};
use cumulus_entity::folder::{Breadcrumb, FolderNode};

use super::engine::FolderIndex;
use crate::context::RequestContext;

/// Builds folder trees and resolves paths.
#[derive(Debug, Clone)]
pub struct TreeService {
    /// Folder and file rows.
    records: Arc<dyn RecordStore>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    /// The ACTIVE folder forest under `root` (the top level when `None`).
    ///
    /// Siblings are ordered by name. Folders caught in a parent cycle are
    /// unreachable from the top level; they are logged and left out.
    pub async fn get_tree(
        &self,
        ctx: &RequestContext,
        root: Option<FolderId>,
    ) -> AppResult<Vec<FolderNode>> {
        let folders = self
            .records
            .list_folders(ctx.user_id, FolderQuery::active())
            .await?;
        let index = FolderIndex::new(&folders);

        if let Some(id) = root {
            if !index.contains(id) {
                return Err(AppError::not_found(format!("Folder {id} not found")));
            }
        }

        let cycles = index.find_cycles();
        if !cycles.is_empty() {
            warn!(
                user_id = %ctx.user_id,
                folders = ?cycles,
                "Folder hierarchy contains a cycle"
            );
        }
        Ok(index.build_tree(root))
    }

    /// Root-first path to an ACTIVE folder.
    pub async fn get_breadcrumbs(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
    ) -> AppResult<Vec<Breadcrumb>> {
        let folders = self
            .records
            .list_folders(ctx.user_id, FolderQuery::active())
            .await?;
        let index = FolderIndex::new(&folders);
        if !index.contains(folder_id) {
            return Err(AppError::not_found(format!("Folder {folder_id} not found")));
        }
        Ok(index.breadcrumbs(folder_id))
    }
}
