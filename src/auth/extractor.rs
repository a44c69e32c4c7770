use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::session::{self, SESSION_COOKIE};
use crate::error::AppError;
use crate::state::SharedState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub is_admin: bool,
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }

    /// Session from the cookie jar, if present and valid. Used by public
    /// pages that render differently for admins.
    pub fn from_jar(jar: &CookieJar, secret: &str) -> Option<Self> {
        let cookie = jar.get(SESSION_COOKIE)?;
        let claims = session::decode_token(cookie.value(), secret).ok()?;
        Some(AuthUser {
            user_id: claims.sub,
            is_admin: claims.adm,
        })
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        // Bearer token first, for non-browser clients
        if let Some(auth_header) = parts.headers.get("authorization") {
            let auth_str = auth_header
                .to_str()
                .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                let claims = session::decode_token(token, &state.config.session_secret)
                    .map_err(|_| AppError::Unauthorized("Invalid or expired session".to_string()))?;

                return Ok(AuthUser {
                    user_id: claims.sub,
                    is_admin: claims.adm,
                });
            }
        }

        let jar = CookieJar::from_headers(&parts.headers);
        if jar.get(SESSION_COOKIE).is_some() {
            return AuthUser::from_jar(&jar, &state.config.session_secret)
                .ok_or_else(|| AppError::Unauthorized("Invalid or expired session".to_string()));
        }

        Err(AppError::Unauthorized("Not logged in".to_string()))
    }
}
