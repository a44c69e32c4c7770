use axum::response::Redirect;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;

/// Admins land on the live site, which renders edit controls for them.
/// Anonymous visitors are bounced to the login form by the 401 redirect.
pub async fn gate(auth: AuthUser) -> Result<Redirect, AppError> {
    auth.require_admin()?;
    Ok(Redirect::to("/"))
}
