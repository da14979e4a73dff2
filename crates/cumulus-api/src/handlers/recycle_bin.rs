//! Recycle bin handlers.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use cumulus_core::types::TrashSortKey;
use cumulus_entity::item::{Item, ItemRef, ItemType};
use cumulus_entity::trash::TrashedItem;
use cumulus_service::{PurgeReport, RestoreMode};

use crate::dto::request::{RecycleBinParams, RestoreParams};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Resolve the `item_type` query parameter; files when absent.
fn item_ref(item_type: Option<&str>, id: Uuid) -> ApiResult<ItemRef> {
    let item_type = match item_type {
        Some(raw) => ItemType::from_str(raw)?,
        None => ItemType::File,
    };
    Ok(ItemRef::new(item_type, id))
}

/// GET /api/files/recycle-bin?sort=...
pub async fn list_recycle_bin(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<RecycleBinParams>,
) -> ApiResult<Json<ApiResponse<Vec<TrashedItem>>>> {
    let sort = match params.sort.as_deref() {
        Some(raw) => TrashSortKey::from_str(raw)?,
        None => TrashSortKey::default(),
    };
    let items = state.recycle_bin.list_trashed(&auth, sort).await?;
    Ok(Json(ApiResponse::ok(items)))
}

/// DELETE /api/files/recycle-bin
pub async fn empty_recycle_bin(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<PurgeReport>>> {
    let report = state.recycle_bin.empty(&auth).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// DELETE /api/files/recycle-bin/{id}?item_type=file|folder
pub async fn purge_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<RestoreParams>,
) -> ApiResult<Json<ApiResponse<PurgeReport>>> {
    let item = item_ref(params.item_type.as_deref(), id)?;
    let report = state.recycle_bin.purge(&auth, item).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// POST /api/files/restore/{id}?item_type=file|folder&include_children=...
pub async fn restore_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<RestoreParams>,
) -> ApiResult<Json<ApiResponse<Item>>> {
    let item = item_ref(params.item_type.as_deref(), id)?;
    let mode = if params.include_children {
        RestoreMode::Subtree
    } else {
        RestoreMode::Single
    };
    let restored = state.recycle_bin.restore(&auth, item, mode).await?;
    Ok(Json(ApiResponse::ok(restored)))
}
