//! Folder repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_core::types::{FolderId, UserId};
use cumulus_entity::folder::{Folder, FolderPatch};

use super::{map_write_error, push_lifecycle_filter, push_parent_filter};
use crate::store::FolderQuery;

/// Partial unique index enforcing distinct names among ACTIVE siblings.
pub const FOLDER_NAME_INDEX: &str = "folders_active_sibling_name_key";

/// Repository for folder reads and transactional writes.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a folder by ID.
    pub async fn find_by_id(&self, owner: UserId, id: FolderId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    /// List folders matching a query.
    pub async fn list(&self, owner: UserId, filter: &FolderQuery) -> AppResult<Vec<Folder>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM folders WHERE owner_id = ");
        query.push_bind(owner);
        push_parent_filter(&mut query, "parent_id", &filter.parent);
        push_lifecycle_filter(&mut query, filter.lifecycle);
        if let Some(name) = &filter.name {
            query.push(" AND name = ").push_bind(name.clone());
        }
        if let Some(deleted_at) = filter.deleted_at {
            query.push(" AND deleted_at = ").push_bind(deleted_at);
        }
        query.push(" ORDER BY name ASC, id ASC");

        query
            .build_query_as::<Folder>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folders", e))
    }

    /// Insert a folder row.
    pub async fn insert(&self, conn: &mut PgConnection, folder: &Folder) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO folders (id, name, owner_id, parent_id, deleted_at, \
             original_parent_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(folder.id)
        .bind(&folder.name)
        .bind(folder.owner_id)
        .bind(folder.parent_id)
        .bind(folder.deleted_at)
        .bind(folder.original_parent_id)
        .bind(folder.created_at)
        .bind(folder.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, "Failed to create folder", FOLDER_NAME_INDEX))?;
        Ok(())
    }

    /// Apply a partial update. Returns `false` when no row matched.
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        owner: UserId,
        id: FolderId,
        patch: &FolderPatch,
        now: DateTime<Utc>,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> AppResult<bool> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE folders SET ");
        let mut separated = query.separated(", ");

        if let Some(name) = &patch.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name.clone());
        }
        if let Some(parent_id) = patch.parent_id {
            separated.push("parent_id = ");
            separated.push_bind_unseparated(parent_id);
        }
        if let Some(deleted_at) = patch.deleted_at {
            separated.push("deleted_at = ");
            separated.push_bind_unseparated(deleted_at);
        }
        if let Some(original) = patch.original_parent_id {
            separated.push("original_parent_id = ");
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
            .map_err(|e| map_write_error(e, "Failed to update folder", FOLDER_NAME_INDEX))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a folder row. Returns `false` when no row matched.
    pub async fn delete(
        &self,
        conn: &mut PgConnection,
        owner: UserId,
        id: FolderId,
    ) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&mut *conn)
            .await
            .map_err(|e| map_write_error(e, "Failed to delete folder", FOLDER_NAME_INDEX))?;
        Ok(result.rows_affected() > 0)
    }
}
