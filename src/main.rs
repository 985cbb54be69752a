use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use anyhow::Context;
use blogpost_server::{configure, AppState, Settings};
use dotenv::dotenv;
use std::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    // Load configuration
    let config = Settings::new().context("failed to load configuration")?;
    info!("Configuration loaded successfully ({})", config.environment);

    // Initialize application state
    let state = AppState::new(config.clone())
        .await
        .context("failed to initialize application state")?;
    let state = web::Data::new(state);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&address).with_context(|| format!("failed to bind {}", address))?;
    info!("Starting server at http://{}", address);

    let app_state = state.clone();
    let cors_config = config.cors.clone();
    HttpServer::new(move || {
        // Cookies are sent cross-origin, so the frontend origin must be explicit.
        let cors = Cors::default()
            .allowed_origin(&cors_config.allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(cors_config.max_age as usize);

        App::new()
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(configure)
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .context("server terminated with an error")?;

    info!("Server stopped; closing store connections");
    state.shutdown().await?;

    Ok(())
}
