//! File upload, lookup, download and listing.

use bytes::Bytes;
use tracing::{info, warn};

use cumulus_core::result::AppResult;
use cumulus_core::types::{FileId, FolderId};
use cumulus_database::store::{FileQuery, WriteBatch};
use cumulus_entity::file::File;
use cumulus_entity::item::{EntityState, ItemType};
use cumulus_storage::mime::{DEFAULT_MIME_TYPE, mime_from_path};

use super::naming::validate_name;
use super::{LifecycleService, require_state};
use crate::context::RequestContext;

impl LifecycleService {
    /// Store `data` and create an ACTIVE file row for it.
    ///
    /// The blob is written first; if the row cannot be inserted the blob
    /// is deleted again so no orphan is left behind.
    pub async fn upload_file(
        &self,
        ctx: &RequestContext,
        name: &str,
        mime_type: Option<String>,
        folder_id: Option<FolderId>,
        data: Bytes,
    ) -> AppResult<File> {
        let name = validate_name(name, self.config.max_name_length)?;
        self.require_container(ctx, folder_id).await?;
        self.ensure_name_free(ctx, ItemType::File, folder_id, &name)
            .await?;

        let mime_type = mime_type
            .filter(|m| !m.trim().is_empty())
            .or_else(|| mime_from_path(&name))
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
        let size_bytes = data.len() as i64;
        let blob_ref = self.blobs.put(data).await?;

        let file = File {
            id: FileId::new(),
            name,
            mime_type,
            size_bytes,
            blob_ref,
            owner_id: ctx.user_id,
            folder_id,
            deleted_at: None,
            original_folder_id: None,
            created_at: ctx.request_time,
            updated_at: ctx.request_time,
        };

        let mut batch = WriteBatch::new(ctx.user_id, ctx.request_time);
        batch.insert_file(file.clone());
        if let Err(e) = self.records.apply(batch).await {
            if let Err(cleanup) = self.blobs.delete(&file.blob_ref).await {
                warn!(
                    blob = %file.blob_ref,
                    error = %cleanup,
                    "Failed to remove blob of rejected upload"
                );
            }
            return Err(e);
        }

        info!(
            user_id = %ctx.user_id,
            file_id = %file.id,
            folder_id = ?file.folder_id,
            size = file.size_bytes,
            "File uploaded"
        );
        Ok(file)
    }

    /// Fetch one file in any state.
    pub async fn get_file(&self, ctx: &RequestContext, id: FileId) -> AppResult<File> {
        self.load_file(ctx, id).await
    }

    /// Fetch an ACTIVE file together with its bytes.
    ///
    /// A blob missing from the store is a `Storage` failure.
    pub async fn download_file(&self, ctx: &RequestContext, id: FileId) -> AppResult<(File, Bytes)> {
        let file = self.load_file(ctx, id).await?;
        require_state(ItemType::File, file.state(), EntityState::Active)?;
        let data = self.blobs.get(&file.blob_ref).await?;
        Ok((file, data))
    }

    /// ACTIVE files directly inside `folder` (root when `None`).
    pub async fn list_files(
        &self,
        ctx: &RequestContext,
        folder: Option<FolderId>,
    ) -> AppResult<Vec<File>> {
        self.require_container(ctx, folder).await?;
        self.records
            .list_files(ctx.user_id, FileQuery::in_folder(folder))
            .await
    }
}
