pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod auth;
pub mod db;
pub mod models;
pub mod middleware;
pub mod routes;
pub mod views;
pub mod content;
pub mod editor;
pub mod email;
pub mod rate_limit;
pub mod reset;
pub mod upload;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use sqlx::PgPool;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::auth_redirect::redirect_unauthorized;

use crate::auth::password;
use crate::config::Config;
use crate::email::ResetMailer;
use crate::rate_limit::AttemptLimiter;
use crate::state::{AppState, SharedState};

pub fn build_app(pool: PgPool, config: Config) -> (Router, SharedState) {
    // Reset mail is optional; without SMTP the link is logged
    let mailer = config.smtp.as_ref().and_then(|smtp| {
        match ResetMailer::new(smtp) {
            Ok(mailer) => {
                tracing::info!("SMTP relay configured for reset emails");
                Some(Arc::new(mailer))
            }
            Err(e) => {
                tracing::warn!("SMTP relay unavailable, reset links will be logged: {e}");
                None
            }
        }
    });

    let upload_dir = config.upload_dir.clone();
    let max_upload_size = config.max_upload_size;

    let state: SharedState = Arc::new(AppState {
        pool,
        config,
        mailer,
        login_limiter: AttemptLimiter::for_login(),
        reset_limiter: AttemptLimiter::for_password_reset(),
    });

    let app = Router::new()
        .merge(routes::api_routes(max_upload_size))
        .merge(views::view_routes().layer(axum::middleware::from_fn(redirect_unauthorized)))
        .nest_service("/static", ServeDir::new("static"))
        .nest_service(upload::PUBLIC_PREFIX, ServeDir::new(upload_dir))
        .route("/health", axum::routing::get(health))
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}

/// Create the configured admin account when the users table is empty.
/// Returns whether an account was created.
pub async fn bootstrap_admin(pool: &PgPool, config: &Config) -> Result<bool, String> {
    let Some(admin) = &config.admin else {
        return Ok(false);
    };

    let pw_hash = password::hash(&admin.password)?;

    // Advisory lock keeps two starting instances from both seeding
    let mut tx = pool.begin().await.map_err(|e| e.to_string())?;
    sqlx::query("SELECT pg_advisory_xact_lock(1)")
        .execute(&mut *tx)
        .await
        .map_err(|e| e.to_string())?;

    if db::users::count_all(&mut *tx).await.map_err(|e| e.to_string())? > 0 {
        return Ok(false);
    }

    let user = db::users::create(&mut *tx, &admin.email, &pw_hash, "Administrator", true)
        .await
        .map_err(|e| format!("Failed to create admin: {e}"))?;
    tx.commit().await.map_err(|e| e.to_string())?;

    tracing::info!(user_id = %user.id, "Admin account created");
    Ok(true)
}

async fn health() -> &'static str {
    "ok"
}
