//! Cumulus Server: file and folder lifecycle service with a recycle bin.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use cumulus_api::AppState;
use cumulus_core::config::{AppConfig, DatabaseBackend};
use cumulus_core::error::AppError;
use cumulus_core::traits::BlobStore;
use cumulus_database::{DatabasePool, MemoryRecordStore, PgRecordStore, RecordStore};
use cumulus_storage::LocalBlobStore;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `CUMULUS_ENV` overlay and `CUMULUS__*`
/// environment variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("CUMULUS_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("CUMULUS_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load_from(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Cumulus v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Record store ─────────────────────────────────────
    let records: Arc<dyn RecordStore> = match config.database.backend {
        DatabaseBackend::Postgres => {
            let pool = DatabasePool::open(&config.database).await?;
            Arc::new(PgRecordStore::new(pool))
        }
        DatabaseBackend::Memory => {
            tracing::warn!("Using the in-memory record store; data is lost on exit");
            Arc::new(MemoryRecordStore::new())
        }
    };

    // ── Step 2: Blob store ───────────────────────────────────────
    tracing::info!(root = %config.storage.root_path, "Initializing blob store...");
    let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(&config.storage.root_path).await?);

    // ── Step 3: Services and HTTP server ─────────────────────────
    let state = AppState::new(config, records.clone(), blobs);
    let served = cumulus_api::run_server(state).await;
    records.close().await;
    served?;

    tracing::info!("Cumulus server shut down gracefully");
    Ok(())
}
