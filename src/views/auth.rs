use askama::Template;
use axum::Form;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::extractor::AuthUser;
use crate::auth::password;
use crate::auth::session::{self, Claims};
use crate::db;
use crate::middleware::auth_redirect::safe_next;
use crate::reset::{self, ResetOutcome};
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    error: Option<String>,
    next: String,
}

#[derive(Template)]
#[template(path = "auth/forgot_password.html")]
struct ForgotPasswordTemplate;

#[derive(Template)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub valid: bool,
    pub message: String,
    pub token: String,
    pub email: String,
}

impl ResetPasswordTemplate {
    pub fn new(outcome: &ResetOutcome, token: &str, email: &str) -> Self {
        let valid = outcome.is_valid();
        Self {
            valid,
            message: outcome.message().to_string(),
            token: if valid { token.to_string() } else { String::new() },
            email: if valid { email.to_string() } else { String::new() },
        }
    }
}

#[derive(Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct ResetQuery {
    pub token: Option<String>,
    pub email: Option<String>,
}

fn login_form(error: Option<&str>, next: Option<&str>) -> Response {
    let template = LoginTemplate {
        error: error.map(String::from),
        next: safe_next(next).to_string(),
    };
    Html(template.render().unwrap_or_default()).into_response()
}

pub async fn login_page(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(q): Query<LoginQuery>,
) -> Response {
    // Already logged in as admin
    if AuthUser::from_jar(&jar, &state.config.session_secret).is_some_and(|u| u.is_admin) {
        return Redirect::to(safe_next(q.next.as_deref())).into_response();
    }

    login_form(None, q.next.as_deref())
}

pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim();
    let next = form.next.as_deref();

    if state.login_limiter.check(email).is_err() {
        return login_form(
            Some("Too many login attempts. Please try again later."),
            next,
        );
    }

    let user = match db::users::find_by_email(&state.pool, email).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Login lookup failed: {e}");
            return login_form(Some("Something went wrong. Please try again."), next);
        }
    };

    let valid = user.as_ref().is_some_and(|u| {
        password::verify(&form.password, &u.password_hash).unwrap_or_else(|e| {
            tracing::error!("Stored password hash is unreadable: {e}");
            false
        })
    });

    let Some(user) = user.filter(|_| valid) else {
        state.login_limiter.record(email);
        tracing::info!("Failed login attempt");
        return login_form(Some("Invalid email or password."), next);
    };

    let token = match session::encode_token(
        &Claims::new(user.id, user.is_admin),
        &state.config.session_secret,
    ) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to issue session: {e}");
            return login_form(Some("Something went wrong. Please try again."), next);
        }
    };

    state.login_limiter.reset(email);
    tracing::info!(user_id = %user.id, "User logged in");

    let secure = state.config.base_url.starts_with("https://");
    let jar = jar.add(session::session_cookie(&token, secure));
    (jar, Redirect::to(safe_next(next))).into_response()
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.add(session::cleared_session_cookie()), Redirect::to("/"))
}

pub async fn forgot_password_page() -> impl IntoResponse {
    Html(ForgotPasswordTemplate.render().unwrap_or_default())
}

pub async fn reset_password_page(
    State(state): State<SharedState>,
    Query(q): Query<ResetQuery>,
) -> impl IntoResponse {
    let outcome = reset::validate(&state.pool, q.token.as_deref(), q.email.as_deref()).await;
    let template = ResetPasswordTemplate::new(
        &outcome,
        q.token.as_deref().unwrap_or_default(),
        q.email.as_deref().unwrap_or_default(),
    );
    Html(template.render().unwrap_or_default())
}
