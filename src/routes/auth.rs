use axum::Json;
use axum::extract::State;

use crate::api::{ForgotPasswordRequest, MessageResponse, ResetPasswordRequest};
use crate::auth::password;
use crate::db;
use crate::error::AppError;
use crate::reset::{self, ResetOutcome};
use crate::state::SharedState;

const FORGOT_PASSWORD_MESSAGE: &str =
    "If that email is registered, a reset link has been sent.";

pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = req.email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }

    if state.reset_limiter.check(email).is_err() {
        return Err(AppError::RateLimited(
            "Too many reset requests. Please try again later.".to_string(),
        ));
    }
    state.reset_limiter.record(email);

    // Same answer whether or not the account exists
    let response = Json(MessageResponse::ok(FORGOT_PASSWORD_MESSAGE));

    let Some(user) = db::users::find_by_email(&state.pool, email).await? else {
        tracing::debug!("Password reset requested for unknown email");
        return Ok(response);
    };

    let token = reset::issue(&state.pool, user.id).await?;
    let link = reset::reset_link(&state.config.base_url, &token, &user.email);

    match &state.mailer {
        Some(mailer) => {
            if let Err(e) = mailer
                .send_password_reset(&user.email, &user.name, &link)
                .await
            {
                tracing::error!("Failed to send password reset email: {e}");
            }
        }
        None => tracing::warn!("SMTP not configured. Password reset link: {link}"),
    }

    Ok(response)
}

pub async fn reset_password(
    State(state): State<SharedState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let outcome = reset::validate(&state.pool, Some(&req.token), Some(&req.email)).await;
    let user_id = match outcome {
        ResetOutcome::Valid { user_id } => user_id,
        ResetOutcome::Error => {
            return Err(AppError::Internal(
                "Reset token validation failed".to_string(),
            ));
        }
        other => return Err(AppError::BadRequest(other.message().to_string())),
    };

    password::validate_new(&req.password, &req.password_confirm).map_err(AppError::BadRequest)?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;
    db::users::reset_password(&state.pool, user_id, &pw_hash).await?;
    state.login_limiter.reset(&req.email);

    tracing::info!(%user_id, "Password reset completed");

    Ok(Json(MessageResponse::ok(
        "Your password has been updated. You can now log in.",
    )))
}
