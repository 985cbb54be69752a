use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::session::{is_secure_request, removal_cookie, session_cookie};
use crate::auth::token::SessionIdentity;
use crate::error::AppError;
use crate::AppState;

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

pub async fn login(
    req: HttpRequest,
    body: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (email, password) = match (non_empty(&body.email), non_empty(&body.password)) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(AppError::ValidationError("Email and password are required.".into())),
    };

    info!("Received login request for email: {}", email);
    let token = state.auth_service.authenticate(email, password).await?;
    info!("Login successful for email: {}", email);

    let cookie = session_cookie(
        token,
        state.auth_service.codec().lifetime(),
        is_secure_request(&req, &state),
    );
    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({ "message": "Login successful" })))
}

pub async fn me(session: SessionIdentity) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "user": session }))
}

pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(removal_cookie(is_secure_request(&req, &state)))
        .json(json!({ "message": "Logged out" }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

pub async fn change_password(
    session: SessionIdentity,
    body: web::Json<ChangePasswordRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (current, new) = match (non_empty(&body.current_password), non_empty(&body.new_password)) {
        (Some(current), Some(new)) => (current, new),
        _ => {
            return Err(AppError::ValidationError(
                "Current and new passwords are required.".into(),
            ))
        }
    };

    state
        .auth_service
        .change_password(session.id, current, new)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Password changed successfully." })))
}
