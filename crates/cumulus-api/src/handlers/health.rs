//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, ComponentHealth, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = ComponentHealth {
        backend: state.records.backend().to_string(),
        healthy: state.records.health_check().await.unwrap_or(false),
    };
    let storage = ComponentHealth {
        backend: state.blobs.provider_type().to_string(),
        healthy: state.blobs.health_check().await.unwrap_or(false),
    };
    let status = if database.healthy && storage.healthy {
        "ok"
    } else {
        "degraded"
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        storage,
    }))
}
