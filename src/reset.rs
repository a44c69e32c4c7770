//! Password-reset tokens: issuing, hashing and validating inbound links.
//!
//! A user row holds at most one live token: the SHA-256 hash of the
//! plaintext sent by email, plus the time it was requested. Tokens are valid
//! for [`TOKEN_TTL_SECS`] seconds, inclusive of the boundary.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::db;
use crate::models::User;

pub const TOKEN_TTL_SECS: i64 = 3600;

/// Result of checking a reset link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    Valid { user_id: Uuid },
    InvalidToken,
    Expired,
    MissingParams,
    /// Lookup failed; the detail is logged, never shown.
    Error,
}

impl ResetOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ResetOutcome::Valid { .. })
    }

    /// User-facing explanation for every non-valid outcome.
    pub fn message(&self) -> &'static str {
        match self {
            ResetOutcome::Valid { .. } => "Choose a new password.",
            ResetOutcome::InvalidToken => "This reset link is invalid.",
            ResetOutcome::Expired => "This reset link has expired. Please request a new one.",
            ResetOutcome::MissingParams => "The reset link is incomplete.",
            ResetOutcome::Error => "There was an error validating the token. Please try again later.",
        }
    }
}

pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check `token` against what is stored for `user` at time `now`.
pub fn evaluate(token: &str, user: Option<&User>, now: DateTime<Utc>) -> ResetOutcome {
    let Some(user) = user else {
        return ResetOutcome::InvalidToken;
    };
    let (Some(stored_hash), Some(requested_at)) =
        (user.reset_token_hash.as_deref(), user.reset_requested_at)
    else {
        return ResetOutcome::InvalidToken;
    };

    let computed = hash_token(token);
    if !bool::from(computed.as_bytes().ct_eq(stored_hash.as_bytes())) {
        return ResetOutcome::InvalidToken;
    }

    let elapsed = now.signed_duration_since(requested_at).num_seconds();
    if elapsed > TOKEN_TTL_SECS {
        ResetOutcome::Expired
    } else {
        ResetOutcome::Valid { user_id: user.id }
    }
}

/// Validate the `token` and `email` of an inbound reset link.
pub async fn validate(pool: &PgPool, token: Option<&str>, email: Option<&str>) -> ResetOutcome {
    let token = token.map(str::trim).filter(|t| !t.is_empty());
    let email = email.map(str::trim).filter(|e| !e.is_empty());
    let (Some(token), Some(email)) = (token, email) else {
        return ResetOutcome::MissingParams;
    };

    match db::users::find_by_email(pool, email).await {
        Ok(user) => evaluate(token, user.as_ref(), Utc::now()),
        Err(e) => {
            tracing::error!("Failed to look up user for reset token validation: {e}");
            ResetOutcome::Error
        }
    }
}

/// Create a token for the user, overwriting any earlier one. Returns the
/// plaintext to send.
pub async fn issue(pool: &PgPool, user_id: Uuid) -> Result<String, sqlx::Error> {
    let token = generate_token();
    db::users::set_reset_token(pool, user_id, &hash_token(&token), Utc::now()).await?;
    Ok(token)
}

/// Link sent by email; both values are query-encoded.
pub fn reset_link(base_url: &str, token: &str, email: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("token", token)
        .append_pair("email", email)
        .finish();
    format!("{base_url}/auth/reset-password?{query}")
}
