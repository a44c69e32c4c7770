use sqlx::PgPool;

use crate::models::Product;

pub async fn list_active(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE is_active = true ORDER BY sort_order, created_at",
    )
    .fetch_all(pool)
    .await
}
