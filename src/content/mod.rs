//! Projection of stored page fragments and lookup with hardcoded fallbacks.

pub mod render;

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{ContentEntry, ContentType};

/// Identifies one editable fragment on the site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentKey {
    pub section: String,
    pub element_id: String,
}

impl ContentKey {
    pub fn new(section: impl Into<String>, element_id: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            element_id: element_id.into(),
        }
    }
}

static KEY_PART_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap());

impl ContentKey {
    /// Sections and element ids are short slugs; they end up in markup
    /// attributes and upload file names.
    pub fn validate(&self) -> Result<(), String> {
        if !KEY_PART_RE.is_match(&self.section) {
            return Err("Invalid section".to_string());
        }
        if !KEY_PART_RE.is_match(&self.element_id) {
            return Err("Invalid element id".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.section, self.element_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    pub content_type: ContentType,
    pub value: String,
    pub alt_text: Option<String>,
}

/// section -> element_id -> resolved value, rebuilt per request.
#[derive(Debug, Clone, Default)]
pub struct ContentMap {
    sections: HashMap<String, HashMap<String, StoredValue>>,
}

impl ContentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = ContentEntry>) -> Self {
        let mut map = Self::new();
        for entry in entries {
            let kind = entry.kind();
            let value = match kind {
                ContentType::Image => entry
                    .image_path
                    .filter(|p| !p.is_empty())
                    .map(|p| normalize_image_path(&p)),
                ContentType::Text | ContentType::Html => entry.content,
            };
            if let Some(value) = value {
                map.insert(
                    &entry.section,
                    &entry.element_id,
                    StoredValue {
                        content_type: kind,
                        value,
                        alt_text: entry.alt_text,
                    },
                );
            }
        }
        map
    }

    pub fn insert(&mut self, section: &str, element_id: &str, value: StoredValue) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(element_id.to_string(), value);
    }

    pub fn get(&self, section: &str, element_id: &str) -> Option<&StoredValue> {
        self.sections.get(section)?.get(element_id)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.values().all(HashMap::is_empty)
    }
}

/// Stored value for the key, or `default` when nothing usable is stored.
pub fn resolve(section: &str, element_id: &str, default: &str, map: &ContentMap) -> String {
    match map.get(section, element_id) {
        Some(stored) if stored.content_type == ContentType::Image && stored.value.is_empty() => {
            default.to_string()
        }
        Some(stored) => stored.value.clone(),
        None => default.to_string(),
    }
}

/// Make an image path root-relative or explicitly relative.
pub fn normalize_image_path(path: &str) -> String {
    if path.starts_with('/') || path.starts_with("./") {
        path.to_string()
    } else {
        format!("./{path}")
    }
}
