//! Bearer token verification configuration.

use serde::{Deserialize, Serialize};

/// Settings for verifying the identity token presented by callers.
///
/// Cumulus does not issue tokens; it only checks the HS256 signature and
/// takes the owner id from the `sub` claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC secret.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Expected `iss` claim, checked only when set.
    #[serde(default)]
    pub issuer: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            issuer: None,
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}
