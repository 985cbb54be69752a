use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::db::models::Identity;
use crate::error::{AppError, AuthError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Identity ID
    pub username: String,
    pub email: String,
    pub iat: i64,     // Issued at
    pub exp: i64,     // Expiration time
}

/// Identity attached to a request once its session token has verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionIdentity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Sessions always last this long; the cookie Max-Age uses the same value.
pub const SESSION_LIFETIME_HOURS: i64 = 24;

/// Signs and verifies HS256 session tokens. The secret is fixed for the
/// lifetime of the codec.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        // Expiry is checked by hand in `verify_at` so that it has no leeway
        // and can be evaluated against an explicit clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime: Duration::hours(SESSION_LIFETIME_HOURS),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret)
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, AppError> {
        self.issue_at(identity, Utc::now())
    }

    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            sub: identity.id.to_string(),
            username: identity.username.clone(),
            email: identity.email.clone(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.lifetime)
                .ok_or_else(|| AppError::InternalError("token expiry out of range".into()))?
                .timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<SessionIdentity, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Every failure mode collapses into `InvalidToken`; the cause is only logged.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionIdentity, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                AuthError::InvalidToken
            })?
            .claims;

        if now.timestamp() >= claims.exp {
            debug!("Token rejected: expired at {}", claims.exp);
            return Err(AuthError::InvalidToken);
        }

        let id = Uuid::parse_str(&claims.sub).map_err(|_| {
            debug!("Token rejected: malformed subject");
            AuthError::InvalidToken
        })?;

        Ok(SessionIdentity {
            id,
            username: claims.username,
            email: claims.email,
        })
    }
}
