//! In-place content editor.
//!
//! The editor owns a [`Page`] and moves through
//! `Idle -> ModalOpen -> Saving -> {Saved, Failed} -> Idle`. Only one edit
//! session exists at a time: opening a second one while the first is not
//! back to `Idle` is rejected, and every trigger on the page is disabled
//! until it is.

pub mod http;
pub mod page;

use std::time::Duration;

use async_trait::async_trait;

use crate::api::{MessageResponse, SaveContentRequest, UploadResponse};
use crate::content::{ContentKey, normalize_image_path};
use crate::models::ContentType;

pub use page::{EditTrigger, EditableNode, NodeContent, Page, SavedEdit};

/// Delay before the page is reloaded from the server after a save.
pub const RELOAD_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Another session is already open.
    Busy,
    /// Confirm or edit without an open session.
    NoSession,
    /// Target node or key is not on the page.
    UnknownTarget,
    Upload(String),
    Save(String),
    Network(String),
    Parse(String),
}

impl std::fmt::Display for EditorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditorError::Busy => write!(f, "Another edit is already in progress"),
            EditorError::NoSession => write!(f, "No edit in progress"),
            EditorError::UnknownTarget => write!(f, "Element not found on page"),
            EditorError::Upload(msg) => write!(f, "Image upload failed: {msg}"),
            EditorError::Save(msg) => write!(f, "Save failed: {msg}"),
            EditorError::Network(msg) => write!(f, "Network error: {msg}"),
            EditorError::Parse(msg) => write!(f, "Invalid server response: {msg}"),
        }
    }
}

impl std::error::Error for EditorError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Everything the modal works on, captured when a trigger is activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub key: ContentKey,
    pub content_type: ContentType,
    pub current_value: String,
    pub draft: String,
    pub alt_text: Option<String>,
    pub pending_image: Option<ImageFile>,
}

impl EditSession {
    pub fn from_trigger(trigger: &EditTrigger) -> Self {
        Self {
            key: trigger.key.clone(),
            content_type: trigger.content_type,
            current_value: trigger.current_value.clone(),
            draft: trigger.current_value.clone(),
            alt_text: None,
            pending_image: None,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn choose_file(&mut self, file: ImageFile) {
        self.pending_image = Some(file);
    }

    pub fn set_alt_text(&mut self, alt: impl Into<String>) {
        self.alt_text = Some(alt.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    ModalOpen(EditSession),
    Saving(EditSession),
    Saved(SavedEdit),
    Failed { session: EditSession, error: EditorError },
}

/// What the UI does once a save has been acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AfterSave {
    pub notice: String,
    pub reload_after: Duration,
}

/// Transport used by the editor. Errors are transport-level; a response
/// with `success: false` is returned as `Ok`.
#[async_trait]
pub trait EditorBackend: Send + Sync {
    async fn upload_image(
        &self,
        key: &ContentKey,
        file: &ImageFile,
    ) -> Result<UploadResponse, EditorError>;

    async fn save_content(&self, req: &SaveContentRequest) -> Result<MessageResponse, EditorError>;
}

pub struct Editor<B> {
    backend: B,
    page: Page,
    state: EditorState,
    reload_delay: Duration,
}

impl<B: EditorBackend> Editor<B> {
    pub fn new(backend: B, page: Page) -> Self {
        Self {
            backend,
            page,
            state: EditorState::Idle,
            reload_delay: RELOAD_DELAY,
        }
    }

    pub fn with_reload_delay(mut self, delay: Duration) -> Self {
        self.reload_delay = delay;
        self
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Open the modal for the node at `index` (document order).
    pub fn open(&mut self, index: usize) -> Result<&mut EditSession, EditorError> {
        if !matches!(self.state, EditorState::Idle) {
            return Err(EditorError::Busy);
        }
        let node = self.page.node(index).ok_or(EditorError::UnknownTarget)?;
        if !node.trigger.enabled {
            return Err(EditorError::Busy);
        }

        let session = EditSession::from_trigger(&node.trigger);
        tracing::debug!(key = %session.key, "Opening editor");
        self.page.set_triggers_enabled(false);
        self.state = EditorState::ModalOpen(session);
        self.session_mut().ok_or(EditorError::NoSession)
    }

    /// Open the modal for the first node tagged with `key`.
    pub fn open_key(&mut self, key: &ContentKey) -> Result<&mut EditSession, EditorError> {
        let index = self
            .page
            .nodes()
            .iter()
            .position(|n| &n.key == key)
            .ok_or(EditorError::UnknownTarget)?;
        self.open(index)
    }

    /// The session being edited, while the modal is showing.
    pub fn session_mut(&mut self) -> Option<&mut EditSession> {
        match &mut self.state {
            EditorState::ModalOpen(session) => Some(session),
            EditorState::Failed { session, .. } => Some(session),
            _ => None,
        }
    }

    /// Close the modal without saving.
    pub fn cancel(&mut self) {
        if matches!(self.state, EditorState::ModalOpen(_) | EditorState::Failed { .. }) {
            self.state = EditorState::Idle;
            self.page.set_triggers_enabled(true);
        }
    }

    /// Upload (for a newly chosen image), save, and patch the page.
    pub async fn confirm(&mut self) -> Result<SavedEdit, EditorError> {
        let session = match std::mem::replace(&mut self.state, EditorState::Idle) {
            EditorState::ModalOpen(session) | EditorState::Failed { session, .. } => session,
            other => {
                self.state = other;
                return Err(EditorError::NoSession);
            }
        };

        self.state = EditorState::Saving(session.clone());
        match self.submit(&session).await {
            Ok(edit) => {
                let patched = self.page.apply(&edit);
                tracing::info!(key = %edit.key, patched, "Content saved");
                self.state = EditorState::Saved(edit.clone());
                Ok(edit)
            }
            Err(error) => {
                tracing::warn!(key = %session.key, "Edit failed: {error}");
                self.state = EditorState::Failed {
                    session,
                    error: error.clone(),
                };
                Err(error)
            }
        }
    }

    /// Close the modal after a save. The page should be reloaded after
    /// `reload_after`; the in-place patch is only a preview.
    pub fn acknowledge(&mut self) -> Option<AfterSave> {
        if !matches!(self.state, EditorState::Saved(_)) {
            return None;
        }
        self.state = EditorState::Idle;
        self.page.set_triggers_enabled(true);
        Some(AfterSave {
            notice: "Changes saved".to_string(),
            reload_after: self.reload_delay,
        })
    }

    async fn submit(&self, session: &EditSession) -> Result<SavedEdit, EditorError> {
        let (content, image_path) = match session.content_type {
            ContentType::Image => {
                let path = match &session.pending_image {
                    Some(file) => self.upload(&session.key, file).await?,
                    None => session.current_value.clone(),
                };
                (None, Some(path))
            }
            ContentType::Text | ContentType::Html => (Some(session.draft.clone()), None),
        };

        let req = SaveContentRequest {
            section: session.key.section.clone(),
            element_id: session.key.element_id.clone(),
            content_type: session.content_type,
            content: content.clone(),
            image_path: image_path.clone(),
            alt_text: session.alt_text.clone(),
        };

        let resp = self.backend.save_content(&req).await?;
        if !resp.success {
            return Err(EditorError::Save(
                resp.message.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        let value = match (content, image_path) {
            (_, Some(path)) => normalize_image_path(&path),
            (Some(text), None) => text,
            (None, None) => String::new(),
        };

        Ok(SavedEdit {
            key: session.key.clone(),
            content_type: session.content_type,
            value,
            alt_text: session.alt_text.clone(),
        })
    }

    async fn upload(&self, key: &ContentKey, file: &ImageFile) -> Result<String, EditorError> {
        let resp = self.backend.upload_image(key, file).await?;
        if !resp.success {
            return Err(EditorError::Upload(
                resp.message.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }
        resp.image_path
            .filter(|p| !p.is_empty())
            .ok_or_else(|| EditorError::Upload("No image path returned".to_string()))
    }
}
