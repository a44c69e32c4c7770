use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub image_path: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn price_display(&self) -> String {
        super::format_price(self.price_cents)
    }

    pub fn image_src(&self) -> Option<String> {
        self.image_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(crate::content::normalize_image_path)
    }
}
