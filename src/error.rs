use thiserror::Error;
use actix_web::{ResponseError, HttpRequest, HttpResponse, http::StatusCode};
use actix_web::error::{JsonPayloadError, QueryPayloadError};
use serde_json::json;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    AuthError(#[from] AuthError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Message placed in the `{message}` body. Server-side failures are
    /// reported generically; their detail only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::AuthError(e) => e.to_string(),
            AppError::ValidationError(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::DatabaseError(DatabaseError::NotFound) => "Not found".to_string(),
            AppError::DatabaseError(_) | AppError::ConfigError(_) | AppError::InternalError(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

// Implement conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

// Implement conversion from sqlx::Error
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::DatabaseError(DatabaseError::NotFound),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                AppError::DatabaseError(DatabaseError::ConnectionError(err.to_string()))
            }
            _ => AppError::DatabaseError(DatabaseError::QueryError(err.to_string())),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::DatabaseError(DatabaseError::MigrationError(err.to_string()))
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AppError::InternalError(format!("password hashing failed: {}", err))
    }
}

// Add conversion from std::io::Error
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

// Implement actix_web::ResponseError for AppError
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        HttpResponse::build(status).json(json!({
            "message": self.public_message()
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(DatabaseError::NotFound) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConfigError(_) | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Maps body deserialization failures onto the JSON error surface.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    warn!("Rejected request body for {}: {}", req.path(), err);
    AppError::ValidationError("Invalid data".to_string()).into()
}

pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    warn!("Rejected query string for {}: {}", req.path(), err);
    AppError::ValidationError("Invalid query".to_string()).into()
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No token, authorization denied")]
    NoToken,

    #[error("Token is not valid")]
    InvalidToken,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("Current password is incorrect.")]
    WrongCurrentPassword,
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Record not found")]
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_conversion() {
        // Test IO error conversion
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::InternalError(_)));

        // Test config error conversion
        let config_err = config::ConfigError::NotFound(String::from("key not found"));
        let app_err: AppError = config_err.into();
        assert!(matches!(app_err, AppError::ConfigError(_)));

        // Test database error conversion
        let app_err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(app_err, AppError::DatabaseError(DatabaseError::NotFound)));

        let app_err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(app_err, AppError::DatabaseError(DatabaseError::ConnectionError(_))));
    }

    #[test]
    fn test_error_status_codes() {
        for auth in [
            AuthError::NoToken,
            AuthError::InvalidToken,
            AuthError::InvalidCredentials,
            AuthError::WrongCurrentPassword,
        ] {
            assert_eq!(AppError::AuthError(auth).status_code(), StatusCode::UNAUTHORIZED);
        }

        let err = AppError::ValidationError("invalid input".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = AppError::NotFound("User not found.".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = AppError::DatabaseError(DatabaseError::QueryError("boom".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_display() {
        let err = AppError::ValidationError("test error".to_string());
        assert_eq!(err.to_string(), "Validation error: test error");

        let err = AppError::AuthError(AuthError::InvalidCredentials);
        assert_eq!(err.to_string(), "Authentication error: Invalid credentials.");

        let err = AppError::DatabaseError(DatabaseError::NotFound);
        assert_eq!(err.to_string(), "Database error: Record not found");
    }

    #[test]
    fn test_public_message_hides_internals() {
        let err = AppError::DatabaseError(DatabaseError::ConnectionError(
            "postgres://admin:hunter2@db refused".to_string(),
        ));
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::AuthError(AuthError::NoToken);
        assert_eq!(err.public_message(), "No token, authorization denied");
    }

    #[actix_web::test]
    async fn test_error_body_is_json_message() {
        let resp = AppError::AuthError(AuthError::InvalidCredentials).error_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "message": "Invalid credentials." }));
    }
}
