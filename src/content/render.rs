use std::fmt;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::content::{ContentKey, ContentMap, resolve};
use crate::models::ContentType;

/// One resolved fragment, ready to be written into a page.
///
/// Admin renders wrap the value in markup tagged with the fragment's key and
/// add an edit trigger carrying the current value. Every copy of a key on a
/// page carries identical metadata so the editor can patch all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub key: ContentKey,
    pub content_type: ContentType,
    pub value: String,
    pub alt_text: Option<String>,
    pub editable: bool,
}

impl Fragment {
    fn write_value(&self, f: &mut fmt::Formatter<'_>, class: Option<&str>) -> fmt::Result {
        match self.content_type {
            ContentType::Text => write!(f, "{}", encode_text(&self.value)),
            ContentType::Html => f.write_str(&self.value),
            ContentType::Image => {
                let alt = self.alt_text.as_deref().unwrap_or("");
                write!(f, "<img")?;
                if let Some(class) = class {
                    write!(f, " class=\"{class}\"")?;
                }
                write!(
                    f,
                    " src=\"{}\" alt=\"{}\">",
                    encode_double_quoted_attribute(&self.value),
                    encode_double_quoted_attribute(alt)
                )
            }
        }
    }

    fn data_attributes(&self) -> String {
        format!(
            "data-section=\"{}\" data-element=\"{}\" data-type=\"{}\"",
            encode_double_quoted_attribute(&self.key.section),
            encode_double_quoted_attribute(&self.key.element_id),
            self.content_type
        )
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.editable {
            return self.write_value(f, None);
        }

        let data = self.data_attributes();
        let wrapper_class = match self.content_type {
            ContentType::Image => "editable editable-image",
            ContentType::Text | ContentType::Html => "editable",
        };

        write!(f, "<span class=\"{wrapper_class}\" {data}>")?;
        match self.content_type {
            ContentType::Image => self.write_value(f, Some("editable-value"))?,
            ContentType::Text | ContentType::Html => {
                write!(f, "<span class=\"editable-value\">")?;
                self.write_value(f, None)?;
                write!(f, "</span>")?;
            }
        }
        write!(
            f,
            "<button type=\"button\" class=\"edit-trigger\" {data} data-current=\"{}\" aria-label=\"Edit\">&#9998;</button></span>",
            encode_double_quoted_attribute(&self.value)
        )
    }
}

/// Per-request view over the content store used by page templates.
pub struct PageContent {
    map: ContentMap,
    admin: bool,
}

impl PageContent {
    pub fn new(map: ContentMap, admin: bool) -> Self {
        Self { map, admin }
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn text(&self, section: &str, element_id: &str, default: &str) -> Fragment {
        self.fragment(section, element_id, ContentType::Text, default, None)
    }

    pub fn html(&self, section: &str, element_id: &str, default: &str) -> Fragment {
        self.fragment(section, element_id, ContentType::Html, default, None)
    }

    pub fn image(&self, section: &str, element_id: &str, default: &str, alt: &str) -> Fragment {
        self.fragment(section, element_id, ContentType::Image, default, Some(alt))
    }

    /// Plain resolved value, for places where no markup may be emitted
    /// (titles, attributes).
    pub fn value(&self, section: &str, element_id: &str, default: &str) -> String {
        resolve(section, element_id, default, &self.map)
    }

    fn fragment(
        &self,
        section: &str,
        element_id: &str,
        content_type: ContentType,
        default: &str,
        default_alt: Option<&str>,
    ) -> Fragment {
        // A stored value only fills a slot of the same kind
        let stored = match self.map.get(section, element_id) {
            Some(s) if s.content_type == content_type => Some(s),
            Some(s) => {
                tracing::debug!(
                    section,
                    element_id,
                    stored = %s.content_type,
                    slot = %content_type,
                    "Stored content kind does not match the page slot, using default"
                );
                None
            }
            None => None,
        };

        let value = match stored {
            Some(s) if content_type != ContentType::Image || !s.value.is_empty() => s.value.clone(),
            _ => default.to_string(),
        };
        let alt_text = stored
            .and_then(|s| s.alt_text.clone())
            .filter(|a| !a.is_empty())
            .or_else(|| default_alt.map(String::from));

        Fragment {
            key: ContentKey::new(section, element_id),
            content_type,
            value,
            alt_text,
            editable: self.admin,
        }
    }
}
