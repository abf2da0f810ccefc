/**
 * Session Management and JWT Tokens
 *
 * Tokens are HS256 JWTs carrying the user id and email, valid for 30 days.
 * A verified token is only half of authentication: callers must still
 * resolve the user from the store and compare the email claim.
 */

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::error::BackendError;

const TOKEN_LIFETIME_SECS: i64 = 30 * 24 * 60 * 60;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, BackendError> {
        Uuid::parse_str(&self.sub).map_err(|_| BackendError::unauthorized("malformed token subject"))
    }
}

/// Signing and verification keys derived from the configured secret
#[derive(Clone)]
pub struct SessionKeys {
    secret: Arc<str>,
}

impl SessionKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: Arc::from(secret),
        }
    }

    /// Create a token for a user
    pub fn create_token(&self, user_id: Uuid, email: &str) -> Result<String, BackendError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: now + TOKEN_LIFETIME_SECS,
            iat: now,
        };
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &key).map_err(|e| {
            tracing::error!("[Auth] Failed to create token: {:?}", e);
            BackendError::unauthorized("could not issue token")
        })
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify_token(&self, token: &str) -> Result<Claims, BackendError> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());
        decode::<Claims>(token, &key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("[Auth] Token rejected: {}", e);
                BackendError::unauthorized("invalid or expired token")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip_carries_identity() {
        let keys = SessionKeys::new("secret");
        let user_id = Uuid::new_v4();
        let token = keys.create_token(user_id, "ada@example.com").unwrap();

        let claims = keys.verify_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME_SECS);
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let token = SessionKeys::new("one").create_token(Uuid::new_v4(), "a@b.c").unwrap();
        let err = SessionKeys::new("two").verify_token(&token).unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized { .. }));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(SessionKeys::new("secret").verify_token("invalid.token.here").is_err());
    }
}
