//! Response DTOs.

use serde::{Deserialize, Serialize};

use cumulus_entity::item::Item;
use cumulus_service::{DeleteOutcome, PurgeReport};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Record store backend and reachability.
    pub database: ComponentHealth,
    /// Blob store provider and reachability.
    pub storage: ComponentHealth,
}

/// One dependency in the health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Backend name.
    pub backend: String,
    /// Whether the last probe succeeded.
    pub healthy: bool,
}

/// Result of a delete request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteResponse {
    /// Moved to the recycle bin.
    Trashed {
        /// The item as it is now.
        item: Item,
    },
    /// Removed for good.
    Purged {
        /// What was removed.
        report: PurgeReport,
    },
}

impl From<DeleteOutcome> for DeleteResponse {
    fn from(outcome: DeleteOutcome) -> Self {
        match outcome {
            DeleteOutcome::Trashed(item) => Self::Trashed { item },
            DeleteOutcome::Purged(report) => Self::Purged { report },
        }
    }
}
