//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use cumulus_core::config::AppConfig;
use cumulus_core::traits::BlobStore;
use cumulus_database::RecordStore;
use cumulus_service::{LifecycleService, RecycleBinService, TreeService};

use crate::token::TokenVerifier;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Folder and file rows
    pub records: Arc<dyn RecordStore>,
    /// File bytes
    pub blobs: Arc<dyn BlobStore>,
    /// Bearer token verifier
    pub tokens: Arc<TokenVerifier>,

    // ── Services ─────────────────────────────────────────────
    /// Create/rename/move/copy/delete/restore/purge
    pub lifecycle: Arc<LifecycleService>,
    /// Folder tree and breadcrumbs
    pub tree: Arc<TreeService>,
    /// Recycle bin listing
    pub recycle_bin: Arc<RecycleBinService>,
}

impl AppState {
    /// Wire the services over the given stores.
    pub fn new(
        config: AppConfig,
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let lifecycle = Arc::new(LifecycleService::new(
            Arc::clone(&records),
            Arc::clone(&blobs),
            config.lifecycle.clone(),
        ));
        let tree = Arc::new(TreeService::new(Arc::clone(&records)));
        let recycle_bin = Arc::new(RecycleBinService::new(
            Arc::clone(&records),
            Arc::clone(&lifecycle),
        ));
        let tokens = Arc::new(TokenVerifier::new(&config.auth));

        Self {
            config: Arc::new(config),
            records,
            blobs,
            tokens,
            lifecycle,
            tree,
            recycle_bin,
        }
    }
}
