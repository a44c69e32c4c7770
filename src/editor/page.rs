use crate::content::render::Fragment;
use crate::content::{ContentKey, normalize_image_path};
use crate::models::ContentType;

/// Edit affordance bound to one key and the value it reopens with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTrigger {
    pub key: ContentKey,
    pub content_type: ContentType,
    pub current_value: String,
    pub enabled: bool,
}

impl EditTrigger {
    pub fn new(key: ContentKey, content_type: ContentType, current_value: impl Into<String>) -> Self {
        Self {
            key,
            content_type,
            current_value: current_value.into(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    Text(String),
    Image { src: String, alt: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableNode {
    pub key: ContentKey,
    pub content_type: ContentType,
    pub content: NodeContent,
    pub trigger: EditTrigger,
}

impl EditableNode {
    pub fn displayed(&self) -> &str {
        match &self.content {
            NodeContent::Text(text) => text,
            NodeContent::Image { src, .. } => src,
        }
    }
}

impl From<Fragment> for EditableNode {
    fn from(fragment: Fragment) -> Self {
        let content = match fragment.content_type {
            ContentType::Image => NodeContent::Image {
                src: fragment.value.clone(),
                alt: fragment.alt_text.clone().unwrap_or_default(),
            },
            ContentType::Text | ContentType::Html => NodeContent::Text(fragment.value.clone()),
        };
        EditableNode {
            trigger: EditTrigger::new(fragment.key.clone(), fragment.content_type, fragment.value),
            key: fragment.key,
            content_type: fragment.content_type,
            content,
        }
    }
}

/// A successful save, as applied to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedEdit {
    pub key: ContentKey,
    pub content_type: ContentType,
    pub value: String,
    pub alt_text: Option<String>,
}

/// The editable nodes of a rendered page, in document order.
#[derive(Debug, Clone, Default)]
pub struct Page {
    nodes: Vec<EditableNode>,
}

impl Page {
    pub fn from_fragments(fragments: impl IntoIterator<Item = Fragment>) -> Self {
        Self {
            nodes: fragments.into_iter().map(EditableNode::from).collect(),
        }
    }

    pub fn nodes(&self) -> &[EditableNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&EditableNode> {
        self.nodes.get(index)
    }

    pub fn nodes_for<'a>(&'a self, key: &'a ContentKey) -> impl Iterator<Item = &'a EditableNode> + 'a {
        self.nodes.iter().filter(move |n| &n.key == key)
    }

    pub fn set_triggers_enabled(&mut self, enabled: bool) {
        for node in &mut self.nodes {
            node.trigger.enabled = enabled;
        }
    }

    /// Patch every node tagged with the edit's key and re-bind its trigger
    /// to the new value. Returns how many nodes changed.
    pub fn apply(&mut self, edit: &SavedEdit) -> usize {
        let mut patched = 0;
        for node in self.nodes.iter_mut().filter(|n| n.key == edit.key) {
            let shown = match (&mut node.content, edit.content_type) {
                (NodeContent::Image { src, alt }, ContentType::Image) => {
                    *src = normalize_image_path(&edit.value);
                    if let Some(new_alt) = &edit.alt_text {
                        *alt = new_alt.clone();
                    }
                    src.clone()
                }
                (NodeContent::Text(text), ContentType::Text | ContentType::Html) => {
                    *text = edit.value.clone();
                    text.clone()
                }
                _ => {
                    tracing::warn!(key = %edit.key, "Skipping node whose kind does not match the saved content");
                    continue;
                }
            };
            let enabled = node.trigger.enabled;
            node.trigger = EditTrigger {
                enabled,
                ..EditTrigger::new(edit.key.clone(), edit.content_type, shown)
            };
            patched += 1;
        }
        patched
    }
}
