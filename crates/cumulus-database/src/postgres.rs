//! PostgreSQL-backed [`RecordStore`].

use async_trait::async_trait;
use tracing::debug;

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_core::types::{FileId, FolderId, UserId};
use cumulus_entity::file::File;
use cumulus_entity::folder::Folder;

use crate::connection::DatabasePool;
use crate::repositories::{FileRepository, FolderRepository};
use crate::store::{FileQuery, FolderQuery, RecordStore, RecordWrite, WriteBatch};

/// Record store over a PostgreSQL pool. Each batch runs in one transaction.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: DatabasePool,
    folders: FolderRepository,
    files: FileRepository,
}

impl PgRecordStore {
    /// Create a store over an opened pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            folders: FolderRepository::new(pool.pool().clone()),
            files: FileRepository::new(pool.pool().clone()),
            pool,
        }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    fn backend(&self) -> &str {
        "postgres"
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.pool.ping().await
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    async fn find_folder(&self, owner: UserId, id: FolderId) -> AppResult<Option<Folder>> {
        self.folders.find_by_id(owner, id).await
    }

    async fn find_file(&self, owner: UserId, id: FileId) -> AppResult<Option<File>> {
        self.files.find_by_id(owner, id).await
    }

    async fn list_folders(&self, owner: UserId, query: FolderQuery) -> AppResult<Vec<Folder>> {
        self.folders.list(owner, &query).await
    }

    async fn list_files(&self, owner: UserId, query: FileQuery) -> AppResult<Vec<File>> {
        self.files.list(owner, &query).await
    }

    async fn apply(&self, batch: WriteBatch) -> AppResult<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let owner = batch.owner();
        let now = batch.now();
        let mut tx = self.pool.pool().begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut written = 0usize;
        for write in batch.writes() {
            let applied = match write {
                RecordWrite::InsertFolder(folder) => {
                    if folder.owner_id != owner {
                        return Err(AppError::internal("Folder insert for a foreign owner"));
                    }
                    self.folders.insert(&mut *tx, folder).await?;
                    true
                }
                RecordWrite::InsertFile(file) => {
                    if file.owner_id != owner {
                        return Err(AppError::internal("File insert for a foreign owner"));
                    }
                    self.files.insert(&mut *tx, file).await?;
                    true
                }
                RecordWrite::UpdateFolder {
                    id,
                    patch,
                    expected_updated_at,
                } => {
                    self.folders
                        .update(&mut *tx, owner, *id, patch, now, *expected_updated_at)
                        .await?
                }
                RecordWrite::UpdateFile {
                    id,
                    patch,
                    expected_updated_at,
                } => {
                    self.files
                        .update(&mut *tx, owner, *id, patch, now, *expected_updated_at)
                        .await?
                }
                RecordWrite::DeleteFolder(id) => self.folders.delete(&mut *tx, owner, *id).await?,
                RecordWrite::DeleteFile(id) => self.files.delete(&mut *tx, owner, *id).await?,
            };
            if !applied {
                return Err(AppError::stale_state(
                    "An item changed or disappeared while the operation was running",
                ));
            }
            written += 1;
        }

        // Foreign keys are deferred, so ordering problems surface here.
        tx.commit().await.map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::stale_state("The referenced folder no longer exists")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e),
        })?;

        debug!(owner_id = %owner, writes = written, "Record batch committed");
        Ok(written)
    }
}
