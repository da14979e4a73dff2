//! Request context carrying the authenticated owner and the request time.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use cumulus_core::types::UserId;

/// Context for the current authenticated request.
///
/// Extracted by the HTTP layer and passed into service methods so that
/// every operation knows *who* is acting. Every query is scoped to
/// `user_id`, and every timestamp written by one operation is
/// `request_time`, which keeps a cascade stamped with a single value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated owner.
    pub user_id: UserId,
    /// When the request was received, truncated to microseconds so that
    /// values read back from PostgreSQL compare equal.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context stamped with the current time.
    pub fn new(user_id: UserId) -> Self {
        Self::at(user_id, Utc::now())
    }

    /// Creates a request context with an explicit time.
    pub fn at(user_id: UserId, request_time: DateTime<Utc>) -> Self {
        Self {
            user_id,
            request_time: request_time.trunc_subsecs(6),
        }
    }
}
