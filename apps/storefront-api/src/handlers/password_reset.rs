//! Password reset requests.

use actix_web::{HttpResponse, web};

use haven_core::domain::{PasswordReset, ThrottleScope};
use haven_shared::ApiResponse;
use haven_shared::dto::{AcceptedResponse, PasswordResetRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/password-reset
///
/// Throttled per address. A delivered request clears the address's
/// counter so a user who got the email is not penalised for earlier tries.
pub async fn request_reset(
    state: web::Data<AppState>,
    body: web::Json<PasswordResetRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let throttle = state.throttle(ThrottleScope::PasswordReset, &req.email);

    if !throttle.check() {
        let minutes = throttle.reset_after().div_ceil(60);
        return Err(AppError::too_many_requests(
            format!("Too many password reset attempts. Please try again in {minutes} minutes."),
            throttle.reset_after(),
        ));
    }

    let reset = PasswordReset::new(&req.email)?;
    state.password_resets.send(&reset).await?;

    throttle.clear();
    tracing::info!(request_id = %reset.id, "Password reset requested");

    Ok(HttpResponse::Accepted().json(ApiResponse::ok_with_message(
        AcceptedResponse {
            id: reset.id.to_string(),
        },
        "Password reset link sent! Check your email.",
    )))
}
