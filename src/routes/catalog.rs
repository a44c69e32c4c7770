use axum::Json;
use axum::extract::State;

use crate::api::{PlansResponse, ProductsResponse};
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;

pub async fn plans(State(state): State<SharedState>) -> Result<Json<PlansResponse>, AppError> {
    let planes = db::plans::list_active(&state.pool).await?;
    Ok(Json(PlansResponse {
        success: true,
        planes,
    }))
}

pub async fn products(
    State(state): State<SharedState>,
) -> Result<Json<ProductsResponse>, AppError> {
    let productos = db::products::list_active(&state.pool).await?;
    Ok(Json(ProductsResponse {
        success: true,
        productos,
    }))
}
