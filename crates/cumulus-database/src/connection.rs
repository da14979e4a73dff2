//! PostgreSQL pool lifecycle for the record store: open, probe, close.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use cumulus_core::config::DatabaseConfig;
use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;

use crate::migration::run_migrations;

/// The pool shared by the Postgres record store and its repositories.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Connect and bring the schema up to date.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %redact_url(&config.url),
            max_connections = config.max_connections,
            "Opening record store pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to record store: {e}"),
                    e,
                )
            })?;

        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> AppResult<bool> {
        if self.pool.is_closed() {
            return Ok(false);
        }
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Record store ping failed", e))
    }

    /// Wait for checked-out connections to return, then close them all.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Record store pool closed");
    }
}

/// Replace the password in a connection URL with `****`.
fn redact_url(url: &str) -> String {
    let Some((credentials, host)) = url.rsplit_once('@') else {
        return url.to_string();
    };
    let scheme_end = credentials.find("://").map_or(0, |p| p + 3);
    match credentials[scheme_end..].split_once(':') {
        Some((user, _)) => format!("{}{user}:****@{host}", &credentials[..scheme_end]),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_url() {
        assert_eq!(
            redact_url("postgres://cumulus:s3cret@db:5432/cumulus"),
            "postgres://cumulus:****@db:5432/cumulus"
        );
        assert_eq!(
            redact_url("postgres://cumulus@db/cumulus"),
            "postgres://cumulus@db/cumulus"
        );
        assert_eq!(redact_url("postgres://db/cumulus"), "postgres://db/cumulus");
    }
}
