use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::token::TokenCodec;
use crate::config::AdminSeedConfig;
use crate::db::models::Identity;
use crate::db::store::CredentialStore;
use crate::error::{AppError, AuthError};

pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    codec: Arc<TokenCodec>,
}

impl AuthService {
    pub fn new(credentials: Arc<dyn CredentialStore>, codec: Arc<TokenCodec>) -> Self {
        Self { credentials, codec }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Checks the credentials and issues a session token. An unknown email
    /// and a wrong password fail identically.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, AppError> {
        let identity = match self.credentials.find_by_email(email).await? {
            Some(identity) => identity,
            None => {
                warn!("Login rejected for {}: unknown email", email);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !verify_password_blocking(password.to_string(), identity.password_hash.clone()).await? {
            warn!("Login rejected for {}: wrong password", email);
            return Err(AuthError::InvalidCredentials.into());
        }

        self.codec.issue(&identity)
    }

    /// Replaces the stored hash. Tokens issued before the change stay valid
    /// until they expire.
    pub async fn change_password(
        &self,
        identity_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let mut identity = self
            .credentials
            .find_by_id(identity_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".into()))?;

        if !verify_password_blocking(current_password.to_string(), identity.password_hash.clone()).await? {
            warn!("Password change rejected for {}: wrong current password", identity.email);
            return Err(AuthError::WrongCurrentPassword.into());
        }

        identity.password_hash = hash_password_blocking(new_password.to_string()).await?;
        self.credentials.save(&identity).await?;

        info!("Password changed for {}", identity.email);
        Ok(())
    }

    /// Creates the configured admin unless an identity with that email
    /// already exists. Returns whether one was created.
    pub async fn seed_admin(&self, seed: &AdminSeedConfig) -> Result<bool, AppError> {
        if self.credentials.find_by_email(&seed.email).await?.is_some() {
            return Ok(false);
        }

        let hash = hash_password_blocking(seed.password.clone()).await?;
        let identity = Identity::new(seed.username.clone(), seed.email.clone(), hash);
        self.credentials.save(&identity).await?;

        info!("Seeded admin identity {}", identity.email);
        Ok(true)
    }
}
