//! Bearer token verification.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cumulus_core::config::AuthConfig;
use cumulus_core::error::AppError;
use cumulus_core::types::UserId;

/// Claims read from an access token. Issuance happens elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the owner id.
    pub sub: Uuid,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    /// Returns the owner id from the subject claim.
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.sub)
    }
}

/// Validates HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    /// Creates a verifier from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer.as_str()]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates a token string.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AppError::authentication("Invalid token format")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AppError::authentication("Unexpected token issuer")
                }
                _ => AppError::authentication(format!("Token validation failed: {e}")),
            }
        })?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use cumulus_core::error::ErrorKind;
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    fn mint(secret: &str, sub: Uuid, exp_offset: i64, iss: Option<&str>) -> String {
        let claims = Claims {
            sub,
            exp: Utc::now().timestamp() + exp_offset,
            iat: Some(Utc::now().timestamp()),
            iss: iss.map(String::from),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn config(secret: &str, issuer: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            issuer: issuer.map(String::from),
        }
    }

    #[test]
    fn test_valid_token_yields_owner() {
        let sub = Uuid::new_v4();
        let verifier = TokenVerifier::new(&config("s3cret", None));
        let claims = verifier.verify(&mint("s3cret", sub, 600, None)).unwrap();
        assert_eq!(claims.user_id(), UserId::from_uuid(sub));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let verifier = TokenVerifier::new(&config("s3cret", None));
        let err = verifier
            .verify(&mint("other", Uuid::new_v4(), 600, None))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_expired_token_rejected() {
        let verifier = TokenVerifier::new(&config("s3cret", None));
        let err = verifier
            .verify(&mint("s3cret", Uuid::new_v4(), -600, None))
            .unwrap_err();
        assert_eq!(err.message, "Token has expired");
    }

    #[test]
    fn test_issuer_checked_when_configured() {
        let verifier = TokenVerifier::new(&config("s3cret", Some("idp")));
        assert!(
            verifier
                .verify(&mint("s3cret", Uuid::new_v4(), 600, Some("idp")))
                .is_ok()
        );
        assert!(
            verifier
                .verify(&mint("s3cret", Uuid::new_v4(), 600, Some("elsewhere")))
                .is_err()
        );
    }
}
