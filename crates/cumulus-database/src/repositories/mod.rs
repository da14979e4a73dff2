//! Repository implementations for the `folders` and `files` tables.

pub mod file;
pub mod folder;

pub use file::FileRepository;
pub use folder::FolderRepository;

use sqlx::{Postgres, QueryBuilder};

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::types::{FolderId, LifecycleFilter, ParentFilter};
use uuid::Uuid;

/// Append ` AND <column> <filter>` for a nullable folder reference.
pub(crate) fn push_parent_filter(
    query: &mut QueryBuilder<'_, Postgres>,
    column: &str,
    filter: &ParentFilter<FolderId>,
) {
    match filter {
        ParentFilter::Any => {}
        ParentFilter::Root => {
            query.push(format!(" AND {column} IS NULL"));
        }
        ParentFilter::Id(id) => {
            query.push(format!(" AND {column} = ")).push_bind(*id);
        }
        ParentFilter::In(ids) => {
            let ids: Vec<Uuid> = ids.iter().map(|id| id.into_uuid()).collect();
            query
                .push(format!(" AND {column} = ANY("))
                .push_bind(ids)
                .push(")");
        }
    }
}

/// Append the `deleted_at` presence check.
pub(crate) fn push_lifecycle_filter(
    query: &mut QueryBuilder<'_, Postgres>,
    filter: LifecycleFilter,
) {
    match filter {
        LifecycleFilter::Active => {
            query.push(" AND deleted_at IS NULL");
        }
        LifecycleFilter::Trashed => {
            query.push(" AND deleted_at IS NOT NULL");
        }
        LifecycleFilter::Any => {}
    }
}

/// Map a failed write, turning constraint violations into domain errors.
pub(crate) fn map_write_error(e: sqlx::Error, context: &str, name_index: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(name_index) => {
            AppError::conflict("An item with this name already exists in the destination")
        }
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::stale_state("The referenced folder no longer exists")
        }
        _ => AppError::with_source(ErrorKind::Database, context.to_string(), e),
    }
}
