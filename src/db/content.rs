use sqlx::PgPool;

use crate::models::{ContentEntry, ContentType};

/// Fields written by an admin save.
#[derive(Debug, Clone)]
pub struct ContentWrite<'a> {
    pub section: &'a str,
    pub element_id: &'a str,
    pub content_type: ContentType,
    pub content: Option<&'a str>,
    pub image_path: Option<&'a str>,
    pub alt_text: Option<&'a str>,
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<ContentEntry>, sqlx::Error> {
    sqlx::query_as::<_, ContentEntry>(
        "SELECT * FROM content_entries ORDER BY section, element_id",
    )
    .fetch_all(pool)
    .await
}

pub async fn find(
    pool: &PgPool,
    section: &str,
    element_id: &str,
) -> Result<Option<ContentEntry>, sqlx::Error> {
    sqlx::query_as::<_, ContentEntry>(
        "SELECT * FROM content_entries WHERE section = $1 AND element_id = $2",
    )
    .bind(section)
    .bind(element_id)
    .fetch_optional(pool)
    .await
}

pub async fn upsert(pool: &PgPool, entry: &ContentWrite<'_>) -> Result<ContentEntry, sqlx::Error> {
    sqlx::query_as::<_, ContentEntry>(
        "INSERT INTO content_entries (section, element_id, content_type, content, image_path, alt_text)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (section, element_id) DO UPDATE
         SET content_type = EXCLUDED.content_type,
             content = EXCLUDED.content,
             image_path = EXCLUDED.image_path,
             alt_text = COALESCE(EXCLUDED.alt_text, content_entries.alt_text),
             updated_at = now()
         RETURNING *",
    )
    .bind(entry.section)
    .bind(entry.element_id)
    .bind(entry.content_type.as_str())
    .bind(entry.content)
    .bind(entry.image_path)
    .bind(entry.alt_text)
    .fetch_one(pool)
    .await
}
