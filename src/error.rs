//! Errors returned by the JSON API and the admin-only views.
//!
//! Every error renders as `{"success": false, "message": ...}` so the browser
//! editor and the auth forms can show `message` as-is.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    /// A row with the same unique key already exists.
    Conflict(String),
    RateLimited(String),
    Internal(String),
    Database(sqlx::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to show a visitor. Server-side failures are reduced to a
    /// generic line.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::RateLimited(msg) => msg,
            AppError::Internal(_) | AppError::Database(_) => {
                "Something went wrong on our side. Please try again."
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "internal: {msg}"),
            AppError::Database(err) => write!(f, "database: {err}"),
            other => write!(f, "{}: {}", other.status().as_u16(), other.public_message()),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        } else {
            tracing::debug!("Request rejected: {self}");
        }

        let body = json!({ "success": false, "message": self.public_message() });
        (status, axum::Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("That record already exists".to_string())
            }
            _ => AppError::Database(err),
        }
    }
}
