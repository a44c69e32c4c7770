use sqlx::PgPool;

use crate::models::Plan;

pub async fn list_active(pool: &PgPool) -> Result<Vec<Plan>, sqlx::Error> {
    sqlx::query_as::<_, Plan>(
        "SELECT * FROM plans WHERE is_active = true ORDER BY sort_order, created_at",
    )
    .fetch_all(pool)
    .await
}
