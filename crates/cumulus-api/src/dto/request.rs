//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use cumulus_core::error::AppError;

/// Create folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Parent folder ID; the top level when absent.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Rename request, shared by files and folders.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameRequest {
    /// New name.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

/// Move request; a null destination means the top level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Destination folder ID.
    #[serde(default)]
    pub destination_id: Option<Uuid>,
}

/// Copy request; a null destination means the top level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CopyRequest {
    /// Destination folder ID.
    #[serde(default)]
    pub destination_id: Option<Uuid>,
}

/// Query parameters for `DELETE /folders/{id}` and `DELETE /files/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteParams {
    /// Skip the recycle bin.
    #[serde(default)]
    pub permanent: bool,
    /// Allow a permanent delete of an ACTIVE item.
    #[serde(default)]
    pub force: bool,
}

/// Query parameters for `POST /files/restore/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestoreParams {
    /// `file` or `folder`; defaults to `file`.
    pub item_type: Option<String>,
    /// Restore the folder's cascade along with it.
    #[serde(default)]
    pub include_children: bool,
}

/// Query parameters for `GET /folders`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFoldersParams {
    /// Parent folder; the top level when absent.
    pub parent_id: Option<Uuid>,
}

/// Query parameters for `GET /folders/tree`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreeParams {
    /// Subtree root; the whole forest when absent.
    pub root_id: Option<Uuid>,
}

/// Query parameters for `GET /files`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilesParams {
    /// Containing folder; the top level when absent.
    pub folder_id: Option<Uuid>,
}

/// Query parameters for `GET /files/recycle-bin`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecycleBinParams {
    /// `name`, `deleted_at`, `size` or `location`.
    pub sort: Option<String>,
}

/// Run `validator` rules and fold the failures into one `InvalidArgument`.
pub fn validate_request<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate().map_err(|errors| {
        let fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let message = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{field}: {message}")
            })
            .collect();
        AppError::invalid_argument(fields.join("; "))
    })
}
