#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use blogpost_server::config::AdminSeedConfig;
use blogpost_server::{AppState, Settings, SESSION_COOKIE};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse";

/// State over the in-memory store with the admin account already seeded.
pub async fn seeded_state() -> AppState {
    let mut config = Settings::new_for_test().expect("Failed to load test config");
    config.admin = Some(AdminSeedConfig {
        username: ADMIN_USERNAME.to_string(),
        email: ADMIN_EMAIL.to_string(),
        password: ADMIN_PASSWORD.to_string(),
    });
    AppState::new(config).await.expect("Failed to build app state")
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
}

macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .configure(blogpost_server::configure),
        )
        .await
    };
}

macro_rules! login {
    ($app:expr, $email:expr, $password:expr) => {
        actix_web::test::TestRequest::post()
            .uri("/api/admin/login")
            .set_json(serde_json::json!({ "email": $email, "password": $password }))
            .send_request(&$app)
            .await
    };
}
