//! Session gate for protected routes.
//!
//! A handler that takes a [`SessionIdentity`] argument only runs once the
//! `token` cookie has been found and verified. Handlers that do not take one
//! are public.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use tracing::warn;

use crate::auth::token::SessionIdentity;
use crate::error::{AppError, AuthError};
use crate::AppState;

pub const SESSION_COOKIE: &str = "token";

impl FromRequest for SessionIdentity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<SessionIdentity, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalError("application state is not registered".into()))?;

    let token = req
        .cookie(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            warn!("Rejected {} {}: no session cookie", req.method(), req.path());
            AuthError::NoToken
        })?;

    state.auth_service.codec().verify(&token).map_err(|e| {
        warn!("Rejected {} {}: invalid session token", req.method(), req.path());
        e.into()
    })
}

/// `Secure` is set when the request came in over TLS (directly or as
/// reported by a proxy) and always in production.
pub fn is_secure_request(req: &HttpRequest, state: &AppState) -> bool {
    req.connection_info().scheme() == "https" || state.config.is_production()
}

pub fn session_cookie(token: String, lifetime: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(CookieDuration::seconds(lifetime.num_seconds()))
        .finish()
}

pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .finish();
    cookie.make_removal();
    cookie
}
