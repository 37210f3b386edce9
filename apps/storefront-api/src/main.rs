//! # Haven Storefront API
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use haven_core::domain::ThrottleScope;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::rate_limit::ApiRateLimit;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Haven Storefront API on {}:{}",
        config.host,
        config.port
    );
    for scope in ThrottleScope::ALL {
        let policy = config.policies.get(scope);
        tracing::info!(
            scope = %scope,
            max_attempts = policy.max_attempts,
            window_secs = policy.window.as_secs(),
            lockout_secs = policy.lockout().as_secs(),
            "Rate limit policy"
        );
    }

    // Build application state
    let state = AppState::new(&config).await;
    let api_limit = ApiRateLimit::new(
        state.limiter.clone(),
        *state.policies.get(ThrottleScope::Api),
    );

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .wrap(api_limit.clone())
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
