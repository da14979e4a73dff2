//! Route definitions for the Cumulus HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = usize::try_from(state.config.storage.max_upload_size_bytes)
        .unwrap_or(usize::MAX);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
    let cors = build_cors_layer(&state.config.server.cors);

    let api_routes = Router::new()
        .merge(folder_routes())
        .merge(file_routes())
        .merge(recycle_bin_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(request_logging))
        .with_state(state)
}

/// Folder CRUD, tree, and lifecycle
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/folders",
            get(handlers::folder::list_folders).post(handlers::folder::create_folder),
        )
        .route("/folders/tree", get(handlers::folder::get_tree))
        .route(
            "/folders/{id}",
            get(handlers::folder::get_folder).delete(handlers::folder::delete_folder),
        )
        .route(
            "/folders/{id}/breadcrumbs",
            get(handlers::folder::get_breadcrumbs),
        )
        .route("/folders/{id}/rename", patch(handlers::folder::rename_folder))
        .route("/folders/{id}/move", patch(handlers::folder::move_folder))
        .route("/folders/{id}/copy", post(handlers::folder::copy_folder))
}

/// File upload, download, and lifecycle
fn file_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/files",
            get(handlers::file::list_files).post(handlers::file::upload_file),
        )
        .route(
            "/files/{id}",
            get(handlers::file::get_file).delete(handlers::file::delete_file),
        )
        .route("/files/{id}/download", get(handlers::file::download_file))
        .route("/files/{id}/rename", patch(handlers::file::rename_file))
        .route("/files/{id}/move", patch(handlers::file::move_file))
        .route("/files/{id}/copy", post(handlers::file::copy_file))
}

/// Recycle bin listing, restore, and purge
fn recycle_bin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/files/recycle-bin",
            get(handlers::recycle_bin::list_recycle_bin)
                .delete(handlers::recycle_bin::empty_recycle_bin),
        )
        .route(
            "/files/recycle-bin/{id}",
            delete(handlers::recycle_bin::purge_item),
        )
        .route(
            "/files/restore/{id}",
            post(handlers::recycle_bin::restore_item),
        )
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
