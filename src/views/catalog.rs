use askama::Template;

use crate::db;
use crate::models::{Plan, Product};
use crate::state::SharedState;

/// What a catalog section shows.
#[derive(Debug)]
pub enum CatalogView<T> {
    Empty,
    Loaded(Vec<T>),
    Error(String),
}

impl<T> CatalogView<T> {
    /// Failures are logged and shown inline; the rest of the page still renders.
    pub fn from_result(result: Result<Vec<T>, sqlx::Error>, what: &str) -> Self {
        match result {
            Ok(items) if items.is_empty() => CatalogView::Empty,
            Ok(items) => CatalogView::Loaded(items),
            Err(e) => {
                tracing::error!("Failed to load {what}: {e}");
                CatalogView::Error(format!("We couldn't load the {what} right now."))
            }
        }
    }
}

#[derive(Template)]
#[template(path = "partials/plans.html")]
pub struct PlansPartial {
    pub view: CatalogView<Plan>,
}

#[derive(Template)]
#[template(path = "partials/products.html")]
pub struct ProductsPartial {
    pub view: CatalogView<Product>,
}

pub async fn load_plans(state: &SharedState) -> PlansPartial {
    PlansPartial {
        view: CatalogView::from_result(db::plans::list_active(&state.pool).await, "plans"),
    }
}

pub async fn load_products(state: &SharedState) -> ProductsPartial {
    ProductsPartial {
        view: CatalogView::from_result(db::products::list_active(&state.pool).await, "products"),
    }
}
