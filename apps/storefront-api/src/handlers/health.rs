//! Liveness check that also reports the active throttling policies.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, web};
use serde::Serialize;

use haven_core::domain::ThrottleScope;

use crate::state::AppState;

#[derive(Serialize)]
pub struct PolicySummary {
    pub max_attempts: u32,
    pub window_secs: u64,
    pub lockout_secs: u64,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// Effective policy per scope, after environment overrides.
    pub rate_limits: BTreeMap<&'static str, PolicySummary>,
    pub admin_reset_enabled: bool,
}

/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let rate_limits = ThrottleScope::ALL
        .into_iter()
        .map(|scope| {
            let policy = state.policies.get(scope);
            let summary = PolicySummary {
                max_attempts: policy.max_attempts,
                window_secs: policy.window.as_secs(),
                lockout_secs: policy.lockout().as_secs(),
            };
            (scope.as_str(), summary)
        })
        .collect();

    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        rate_limits,
        admin_reset_enabled: state.admin_token.is_some(),
    })
}
