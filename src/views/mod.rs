pub mod admin;
pub mod auth;
pub mod catalog;
pub mod legal;
pub mod site;

use axum::Router;
use axum::routing::{get, post};

use crate::state::SharedState;

pub fn view_routes() -> Router<SharedState> {
    Router::new()
        // Public pages
        .route("/", get(site::index))
        .route("/privacy", get(legal::privacy))
        .route("/terms", get(legal::terms))
        // Auth views
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/forgot-password", get(auth::forgot_password_page))
        .route("/auth/reset-password", get(auth::reset_password_page))
        // Admin
        .route("/admin", get(admin::gate))
}
