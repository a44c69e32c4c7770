use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub billing_period: String,
    pub features: Vec<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    pub fn price_display(&self) -> String {
        super::format_price(self.price_cents)
    }
}
