//! HTTP handlers and route configuration.

mod health;
mod leads;
mod password_reset;
mod search;
mod throttle;


use actix_web::{error::JsonPayloadError, web};

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/search", web::post().to(search::search))
            .route("/leads", web::post().to(leads::submit_lead))
            .service(
                web::scope("/auth")
                    .route("/password-reset", web::post().to(password_reset::request_reset)),
            )
            // Throttle inspection
            .service(
                web::resource("/rate-limit/{scope}")
                    .route(web::get().to(throttle::status))
                    .route(web::delete().to(throttle::clear)),
            ),
    );
}

/// Malformed JSON bodies become RFC 7807 400 responses.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err: JsonPayloadError, _req| AppError::BadRequest(err.to_string()).into())
}
