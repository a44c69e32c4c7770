use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use super::{EditorBackend, EditorError, ImageFile};
use crate::api::{MessageResponse, SaveContentRequest, UploadResponse};
use crate::content::ContentKey;

/// Editor backend talking to the site's content API with an admin session.
pub struct HttpEditorBackend {
    client: reqwest::Client,
    base_url: String,
    session_token: String,
}

impl HttpEditorBackend {
    pub fn new(base_url: &str, session_token: &str) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_token: session_token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl EditorBackend for HttpEditorBackend {
    async fn upload_image(
        &self,
        key: &ContentKey,
        file: &ImageFile,
    ) -> Result<UploadResponse, EditorError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime)
            .map_err(|e| EditorError::Upload(format!("Invalid file type: {e}")))?;

        let form = Form::new()
            .text("section", key.section.clone())
            .text("element_id", key.element_id.clone())
            .part("image", part);

        let resp = self
            .client
            .post(self.url("/api/content/upload"))
            .bearer_auth(&self.session_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| EditorError::Network(e.to_string()))?;

        if resp.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Err(EditorError::Upload("File too large".to_string()));
        }

        read_json(resp).await
    }

    async fn save_content(&self, req: &SaveContentRequest) -> Result<MessageResponse, EditorError> {
        let resp = self
            .client
            .post(self.url("/api/content"))
            .bearer_auth(&self.session_token)
            .json(req)
            .send()
            .await
            .map_err(|e| EditorError::Network(e.to_string()))?;

        read_json(resp).await
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, EditorError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| EditorError::Network(e.to_string()))?;

    serde_json::from_str(&body).map_err(|e| {
        tracing::debug!(%status, "Unparseable response body: {body}");
        EditorError::Parse(e.to_string())
    })
}
