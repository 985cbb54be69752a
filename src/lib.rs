pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod posts;

use std::sync::Arc;
use std::time::Duration;
use actix_web::{web, HttpResponse};
use tracing::info;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AuthService, SessionIdentity, TokenCodec, SESSION_COOKIE};
pub use db::{CredentialStore, DbOperations, MemoryStore, PostStore};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Registers every route and the JSON error handlers on an `App`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    use crate::auth::handlers as admin;
    use crate::posts::handlers as post_routes;

    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/admin")
                .route("/login", web::post().to(admin::login))
                .route("/me", web::get().to(admin::me))
                .route("/logout", web::post().to(admin::logout))
                .route("/change-password", web::post().to(admin::change_password)),
        )
        .service(
            web::scope("/api/posts")
                .route("", web::get().to(post_routes::list_posts))
                .route("", web::post().to(post_routes::create_post))
                .route("/{id}", web::get().to(post_routes::get_post))
                .route("/{id}", web::put().to(post_routes::update_post))
                .route("/{id}", web::delete().to(post_routes::delete_post)),
        );
}

/// Application state shared across all components
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub auth_service: Arc<AuthService>,
    pub posts: Arc<dyn PostStore>,
    db: Option<DbOperations>,
}

impl AppState {
    /// Connects the store named by `database.url`, runs migrations for
    /// Postgres, and seeds the admin account when one is configured.
    pub async fn new(config: Settings) -> Result<Self> {
        let state = if config.database.url.starts_with("memory://") {
            info!("Using in-memory store; data will not survive a restart");
            let store = Arc::new(MemoryStore::new());
            Self::with_stores(config, store.clone(), store)
        } else {
            let db = DbOperations::new_with_options(
                &config.database.url,
                config.database.max_connections,
                Duration::from_secs(config.database.acquire_timeout_secs),
            )
            .await?;
            db.migrate().await?;
            info!("Connected to Postgres and applied migrations");

            let store = Arc::new(db.clone());
            let mut state = Self::with_stores(config, store.clone(), store);
            state.db = Some(db);
            state
        };

        if let Some(seed) = &state.config.admin {
            state.auth_service.seed_admin(seed).await?;
        }

        Ok(state)
    }

    pub fn with_stores(
        config: Settings,
        credentials: Arc<dyn CredentialStore>,
        posts: Arc<dyn PostStore>,
    ) -> Self {
        let codec = Arc::new(TokenCodec::from_config(&config.auth));
        Self {
            config: Arc::new(config),
            auth_service: Arc::new(AuthService::new(credentials, codec)),
            posts,
            db: None,
        }
    }

    pub async fn shutdown(&self) -> Result<()> {
        // Close database connections
        if let Some(db) = &self.db {
            db.close().await;
        }
        Ok(())
    }
}
