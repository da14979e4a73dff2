//! File repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_core::types::{FileId, UserId};
use cumulus_entity::file::{File, FilePatch};

use super::{map_write_error, push_lifecycle_filter, push_parent_filter};
use crate::store::FileQuery;

/// Partial unique index enforcing distinct names among ACTIVE siblings.
pub const FILE_NAME_INDEX: &str = "files_active_sibling_name_key";

/// Repository for file reads and transactional writes.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a file by ID.
    pub async fn find_by_id(&self, owner: UserId, id: FileId) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    /// List files matching a query.
    pub async fn list(&self, owner: UserId, filter: &FileQuery) -> AppResult<Vec<File>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM files WHERE owner_id = ");
        query.push_bind(owner);
        push_parent_filter(&mut query, "folder_id", &filter.folder);
        push_parent_filter(&mut query, "original_folder_id", &filter.original_folder);
        push_lifecycle_filter(&mut query, filter.lifecycle);
        if let Some(name) = &filter.name {
            query.push(" AND name = ").push_bind(name.clone());
        }
        if let Some(deleted_at) = filter.deleted_at {
            query.push(" AND deleted_at = ").push_bind(deleted_at);
        }
        query.push(" ORDER BY name ASC, id ASC");

        query
            .build_query_as::<File>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    /// Insert a file row.
    pub async fn insert(&self, conn: &mut PgConnection, file: &File) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO files (id, name, mime_type, size_bytes, blob_ref, owner_id, \
             folder_id, deleted_at, original_folder_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(file.id)
        .bind(&file.name)
        .bind(&file.mime_type)
        .bind(file.size_bytes)
        .bind(&file.blob_ref)
        .bind(file.owner_id)
        .bind(file.folder_id)
        .bind(file.deleted_at)
        .bind(file.original_folder_id)
        .bind(file.created_at)
        .bind(file.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, "Failed to create file", FILE_NAME_INDEX))?;
        Ok(())
    }

    /// Apply a partial update. Returns `false` when no row matched.
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        owner: UserId,
        id: FileId,
        patch: &FilePatch,
        now: DateTime<Utc>,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> AppResult<bool> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE files SET ");
        let mut separated = query.separated(", ");

        if let Some(name) = &patch.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name.clone());
        }
        if let Some(folder_id) = patch.folder_id {
            separated.push("folder_id = ");
            separated.push_bind_unseparated(folder_id);
        }
        if let Some(deleted_at) = patch.deleted_at {
            separated.push("deleted_at = ");
            separated.push_bind_unseparated(deleted_at);
        }
        if let Some(original) = patch.original_folder_id {
            separated.push("original_folder_id = ");
            separated.push_bind_unseparated(original);
        }
        separated.push("updated_at = ");
        separated.push_bind_unseparated(now);

        query.push(" WHERE id = ").push_bind(id);
        query.push(" AND owner_id = ").push_bind(owner);
        if let Some(expected) = expected_updated_at {
            query.push(" AND updated_at = ").push_bind(expected);
        }

        let result = query
            .build()
            .execute(&mut *conn)
            .await
            .map_err(|e| map_write_error(e, "Failed to update file", FILE_NAME_INDEX))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a file row. Returns `false` when no row matched.
    pub async fn delete(
        &self,
        conn: &mut PgConnection,
        owner: UserId,
        id: FileId,
    ) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&mut *conn)
            .await
            .map_err(|e| map_write_error(e, "Failed to delete file", FILE_NAME_INDEX))?;
        Ok(result.rows_affected() > 0)
    }
}
