//! # JWT Service
//!
//! HS256 bearer tokens for the admin surface. A token only proves which email
//! it was minted for; whether that email is an admin is checked against the
//! allow-list on every request.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, trace};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Email the token was issued for.
    pub sub: String,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs a token for `email` valid for `lifetime`.
    #[instrument(skip(self))]
    pub fn issue(&self, email: &str, lifetime: Duration) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let claims = Claims {
            sub: email.to_ascii_lowercase(),
            exp: now + lifetime.as_secs(),
            iat: now,
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        trace!("Admin token issued");
        Ok(token)
    }

    /// Verifies signature and expiry and returns the claims.
    #[instrument(skip_all, fields(token_length = token.len()))]
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(token_data) => {
                trace!(sub = %token_data.claims.sub, "Token validated");
                Ok(token_data.claims)
            }
            Err(e) if e.kind() == &jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                debug!("Token expired");
                Err(JwtError::TokenExpired)
            }
            Err(e) => {
                debug!(error = %e, "Invalid token");
                Err(JwtError::InvalidToken)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_validates() {
        let jwt = JwtService::new("test-secret");
        let token = jwt
            .issue("Admin@Energie.fr", Duration::from_secs(60))
            .unwrap();
        let claims = jwt.validate(&token).unwrap();
        assert_eq!(claims.sub, "admin@energie.fr");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = JwtService::new("other-secret")
            .issue("admin@energie.fr", Duration::from_secs(60))
            .unwrap();
        assert!(matches!(
            JwtService::new("test-secret").validate(&token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let jwt = JwtService::new("test-secret");
        assert!(matches!(
            jwt.validate("not.a.token"),
            Err(JwtError::InvalidToken)
        ));
    }
}
