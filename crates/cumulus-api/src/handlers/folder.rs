//! Folder CRUD, tree and lifecycle handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use cumulus_core::types::FolderId;
use cumulus_entity::folder::{Breadcrumb, Folder, FolderNode};
use cumulus_entity::item::{Item, ItemRef};

use crate::dto::request::{
    CopyRequest, CreateFolderRequest, DeleteParams, ListFoldersParams, MoveRequest,
    RenameRequest, TreeParams, validate_request,
};
use crate::dto::response::{ApiResponse, DeleteResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/folders[?parent_id=...]
///
/// Without `parent_id` this is the flat list of every ACTIVE folder.
pub async fn list_folders(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListFoldersParams>,
) -> ApiResult<Json<ApiResponse<Vec<Folder>>>> {
    let folders = match params.parent_id {
        Some(parent_id) => {
            state
                .lifecycle
                .list_folders(&auth, Some(FolderId::from_uuid(parent_id)))
                .await?
        }
        None => state.lifecycle.list_all_folders(&auth).await?,
    };
    Ok(Json(ApiResponse::ok(folders)))
}

/// GET /api/folders/tree?root_id=...
pub async fn get_tree(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<TreeParams>,
) -> ApiResult<Json<ApiResponse<Vec<FolderNode>>>> {
    let tree = state
        .tree
        .get_tree(&auth, params.root_id.map(FolderId::from_uuid))
        .await?;
    Ok(Json(ApiResponse::ok(tree)))
}

/// GET /api/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Folder>>> {
    let folder = state
        .lifecycle
        .get_folder(&auth, FolderId::from_uuid(id))
        .await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// GET /api/folders/{id}/breadcrumbs
pub async fn get_breadcrumbs(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<Breadcrumb>>>> {
    let crumbs = state
        .tree
        .get_breadcrumbs(&auth, FolderId::from_uuid(id))
        .await?;
    Ok(Json(ApiResponse::ok(crumbs)))
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateFolderRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Folder>>)> {
    validate_request(&req)?;
    let folder = state
        .lifecycle
        .create_folder(&auth, &req.name, req.parent_id.map(FolderId::from_uuid))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(folder))))
}

/// PATCH /api/folders/{id}/rename
pub async fn rename_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameRequest>,
) -> ApiResult<Json<ApiResponse<Item>>> {
    validate_request(&req)?;
    let item = state
        .lifecycle
        .rename(&auth, ItemRef::Folder(FolderId::from_uuid(id)), &req.name)
        .await?;
    Ok(Json(ApiResponse::ok(item)))
}

/// PATCH /api/folders/{id}/move
pub async fn move_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveRequest>,
) -> ApiResult<Json<ApiResponse<Item>>> {
    let item = state
        .lifecycle
        .move_item(
            &auth,
            ItemRef::Folder(FolderId::from_uuid(id)),
            req.destination_id.map(FolderId::from_uuid),
        )
        .await?;
    Ok(Json(ApiResponse::ok(item)))
}

/// POST /api/folders/{id}/copy
pub async fn copy_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CopyRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Item>>)> {
    let item = state
        .lifecycle
        .copy_item(
            &auth,
            ItemRef::Folder(FolderId::from_uuid(id)),
            req.destination_id.map(FolderId::from_uuid),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(item))))
}

/// DELETE /api/folders/{id}?permanent=...&force=...
pub async fn delete_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<Json<ApiResponse<DeleteResponse>>> {
    let outcome = state
        .lifecycle
        .delete(
            &auth,
            ItemRef::Folder(FolderId::from_uuid(id)),
            params.permanent,
            params.force,
        )
        .await?;
    Ok(Json(ApiResponse::ok(outcome.into())))
}
