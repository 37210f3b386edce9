//! Throttle inspection and admin reset.

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use serde::Deserialize;

use haven_core::domain::ThrottleScope;
use haven_shared::dto::RateLimitStatusResponse;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ThrottleQuery {
    #[serde(default)]
    pub subject: String,
}

fn parse_scope(raw: &str) -> AppResult<ThrottleScope> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("No throttle scope named '{raw}'")))
}

fn tokens_match(given: &str, expected: &str) -> bool {
    given.len() == expected.len()
        && given
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

fn authorize_admin(req: &HttpRequest, admin_token: Option<&str>) -> AppResult<()> {
    let Some(expected) = admin_token else {
        return Err(AppError::Forbidden);
    };

    let given = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match given {
        Some(token) if tokens_match(token, expected) => Ok(()),
        _ => {
            tracing::warn!("Rejected throttle reset with missing or wrong admin token");
            Err(AppError::Forbidden)
        }
    }
}

/// GET /api/rate-limit/{scope}?subject=
pub async fn status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ThrottleQuery>,
) -> AppResult<HttpResponse> {
    let scope = parse_scope(&path)?;
    let throttle = state.throttle(scope, &query.subject);

    Ok(HttpResponse::Ok().json(RateLimitStatusResponse {
        scope: scope.to_string(),
        key: throttle.key().to_string(),
        max_attempts: throttle.policy().max_attempts,
        remaining: throttle.remaining(),
        reset_after_secs: throttle.reset_after(),
    }))
}

/// DELETE /api/rate-limit/{scope}?subject=
///
/// Requires `Authorization: Bearer <ADMIN_TOKEN>`.
pub async fn clear(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ThrottleQuery>,
) -> AppResult<HttpResponse> {
    authorize_admin(&req, state.admin_token.as_deref())?;

    let scope = parse_scope(&path)?;
    let throttle = state.throttle(scope, &query.subject);
    throttle.clear();

    tracing::info!(key = %throttle.key(), "Throttle cleared by admin");

    Ok(HttpResponse::NoContent().finish())
}
