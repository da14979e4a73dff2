//! A row of the recycle bin listing.

use chrono::{DateTime, Utc};
use cumulus_core::types::FolderId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::item::ItemType;

/// A trashed file or folder with the metadata needed to decide between
/// restore and purge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrashedItem {
    /// Item id.
    pub id: Uuid,
    /// Item name.
    pub name: String,
    /// File or folder.
    pub item_type: ItemType,
    /// Human-readable original location, e.g. `My Files/Work/Reports`.
    pub original_location_path: String,
    /// The folder the item will try to restore into.
    pub original_location_id: Option<FolderId>,
    /// Byte size for files; folders have none.
    pub size: Option<i64>,
    /// When the item was trashed.
    pub deleted_at: DateTime<Utc>,
}
