use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Image,
    Html,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::Html => "html",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ContentType::Text),
            "image" => Ok(ContentType::Image),
            "html" => Ok(ContentType::Html),
            other => Err(format!("Unknown content type: {other}")),
        }
    }
}

/// One stored page fragment, unique per (section, element_id).
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ContentEntry {
    pub id: Uuid,
    pub section: String,
    pub element_id: String,
    pub content_type: String,
    pub content: Option<String>,
    pub image_path: Option<String>,
    pub alt_text: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ContentEntry {
    /// Rows with an unrecognized type are treated as text.
    pub fn kind(&self) -> ContentType {
        self.content_type.parse().unwrap_or(ContentType::Text)
    }
}
