//! # cumulus-api
//!
//! HTTP layer for Cumulus built on Axum: bearer authentication, request
//! DTOs, handlers for folders, files and the recycle bin, and the
//! middleware stack.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod token;

pub use app::run_server;
pub use error::{ApiError, ApiResult};
pub use router::build_router;
pub use state::AppState;
