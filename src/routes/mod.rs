pub mod auth;
pub mod catalog;
pub mod content;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;

use crate::state::SharedState;

pub fn api_routes(max_upload_size: usize) -> Router<SharedState> {
    Router::new()
        // Password reset
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        // Content editing
        .route("/api/content", post(content::save))
        .route(
            "/api/content/upload",
            post(content::upload)
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(max_upload_size)),
        )
        // Catalog
        .route("/api/plans", get(catalog::plans))
        .route("/api/products", get(catalog::products))
}
