use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum_extra::extract::CookieJar;
use chrono::{Datelike, Utc};

use crate::auth::extractor::AuthUser;
use crate::content::ContentMap;
use crate::content::render::PageContent;
use crate::db;
use crate::state::SharedState;
use crate::views::catalog;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub page: PageContent,
    pub plans_html: String,
    pub products_html: String,
    pub year: i32,
}

/// Content for a page render. A store failure falls back to defaults
/// rather than failing the page.
pub async fn load_page_content(state: &SharedState, admin: bool) -> PageContent {
    let map = match db::content::list_all(&state.pool).await {
        Ok(entries) => ContentMap::from_entries(entries),
        Err(e) => {
            tracing::error!("Failed to load page content, using defaults: {e}");
            ContentMap::new()
        }
    };
    PageContent::new(map, admin)
}

pub async fn index(State(state): State<SharedState>, jar: CookieJar) -> impl IntoResponse {
    let admin = AuthUser::from_jar(&jar, &state.config.session_secret)
        .is_some_and(|user| user.is_admin);

    let page = load_page_content(&state, admin).await;
    let plans_html = catalog::load_plans(&state).await.render().unwrap_or_default();
    let products_html = catalog::load_products(&state).await.render().unwrap_or_default();

    let template = IndexTemplate {
        page,
        plans_html,
        products_html,
        year: Utc::now().year(),
    };
    Html(template.render().unwrap_or_default())
}
