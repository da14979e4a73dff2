//! File upload, download and lifecycle handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use uuid::Uuid;

use cumulus_core::error::AppError;
use cumulus_core::types::{FileId, FolderId};
use cumulus_entity::file::File;
use cumulus_entity::item::{Item, ItemRef};

use crate::dto::request::{
    CopyRequest, DeleteParams, ListFilesParams, MoveRequest, RenameRequest, validate_request,
};
use crate::dto::response::{ApiResponse, DeleteResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Generic client-supplied type that says nothing about the content.
const OPAQUE_MIME_TYPE: &str = "application/octet-stream";

/// GET /api/files?folder_id=...
pub async fn list_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListFilesParams>,
) -> ApiResult<Json<ApiResponse<Vec<File>>>> {
    let files = state
        .lifecycle
        .list_files(&auth, params.folder_id.map(FolderId::from_uuid))
        .await?;
    Ok(Json(ApiResponse::ok(files)))
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<File>>> {
    let file = state.lifecycle.get_file(&auth, FileId::from_uuid(id)).await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// GET /api/files/{id}/download
pub async fn download_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let (file, data) = state
        .lifecycle
        .download_file(&auth, FileId::from_uuid(id))
        .await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.mime_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.name.replace('"', "")),
        )
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// POST /api/files (multipart: `file`, optional `folder_id`)
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<File>>)> {
    let mut folder_id: Option<Uuid> = None;
    let mut file_name: Option<String> = None;
    let mut mime_type: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "folder_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(multipart_error)?;
                let text = text.trim();
                if !text.is_empty() {
                    folder_id = Some(
                        Uuid::parse_str(text)
                            .map_err(|_| AppError::invalid_argument("Invalid folder_id"))?,
                    );
                }
            }
            "file" => {
                file_name = field.file_name().map(String::from);
                mime_type = field
                    .content_type()
                    .filter(|m| *m != OPAQUE_MIME_TYPE)
                    .map(String::from);
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(multipart_error)?,
                );
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| AppError::invalid_argument("file is required"))?;
    let file_name =
        file_name.ok_or_else(|| AppError::invalid_argument("file name is required"))?;

    let file = state
        .lifecycle
        .upload_file(
            &auth,
            &file_name,
            mime_type,
            folder_id.map(FolderId::from_uuid),
            data,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(file))))
}

/// Body-limit overruns surface as 413; anything else is a malformed request.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large("Upload exceeds the maximum allowed size")
    } else {
        AppError::invalid_argument(format!("Malformed multipart body: {}", err.body_text()))
    }
}

/// PATCH /api/files/{id}/rename
pub async fn rename_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameRequest>,
) -> ApiResult<Json<ApiResponse<Item>>> {
    validate_request(&req)?;
    let item = state
        .lifecycle
        .rename(&auth, ItemRef::File(FileId::from_uuid(id)), &req.name)
        .await?;
    Ok(Json(ApiResponse::ok(item)))
}

/// PATCH /api/files/{id}/move
pub async fn move_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveRequest>,
) -> ApiResult<Json<ApiResponse<Item>>> {
    let item = state
        .lifecycle
        .move_item(
            &auth,
            ItemRef::File(FileId::from_uuid(id)),
            req.destination_id.map(FolderId::from_uuid),
        )
        .await?;
    Ok(Json(ApiResponse::ok(item)))
}

/// POST /api/files/{id}/copy
pub async fn copy_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CopyRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Item>>)> {
    let item = state
        .lifecycle
        .copy_item(
            &auth,
            ItemRef::File(FileId::from_uuid(id)),
            req.destination_id.map(FolderId::from_uuid),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(item))))
}

/// DELETE /api/files/{id}?permanent=...&force=...
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<Json<ApiResponse<DeleteResponse>>> {
    let outcome = state
        .lifecycle
        .delete(
            &auth,
            ItemRef::File(FileId::from_uuid(id)),
            params.permanent,
            params.force,
        )
        .await?;
    Ok(Json(ApiResponse::ok(outcome.into())))
}
