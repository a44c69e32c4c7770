//! JSON bodies shared by the HTTP handlers and the editor client.

use serde::{Deserialize, Serialize};

use crate::models::{ContentType, Plan, Product};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveContentRequest {
    pub section: String,
    pub element_id: String,
    pub content_type: ContentType,
    pub content: Option<String>,
    pub image_path: Option<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub success: bool,
    pub planes: Vec<Plan>,
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub success: bool,
    pub productos: Vec<Product>,
}
