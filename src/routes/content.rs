use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;

use crate::api::{MessageResponse, SaveContentRequest, UploadResponse};
use crate::auth::extractor::AuthUser;
use crate::content::ContentKey;
use crate::db;
use crate::db::content::ContentWrite;
use crate::error::AppError;
use crate::models::ContentType;
use crate::state::SharedState;
use crate::upload;

pub async fn save(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<SaveContentRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require_admin()?;

    let key = ContentKey::new(req.section.trim(), req.element_id.trim());
    key.validate().map_err(AppError::BadRequest)?;

    let alt_text = req.alt_text.as_deref().map(str::trim).filter(|a| !a.is_empty());
    let (content, image_path) = match req.content_type {
        ContentType::Image => {
            let path = req
                .image_path
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .ok_or_else(|| AppError::BadRequest("Image path is required".to_string()))?;
            (None, Some(path))
        }
        ContentType::Text | ContentType::Html => {
            let content = req
                .content
                .as_deref()
                .ok_or_else(|| AppError::BadRequest("Content is required".to_string()))?;
            (Some(content), None)
        }
    };

    db::content::upsert(
        &state.pool,
        &ContentWrite {
            section: &key.section,
            element_id: &key.element_id,
            content_type: req.content_type,
            content,
            image_path,
            alt_text,
        },
    )
    .await?;

    tracing::info!(
        user_id = %auth.user_id,
        key = %key,
        content_type = %req.content_type,
        "Content updated"
    );

    Ok(Json(MessageResponse::ok("Content saved")))
}

pub async fn upload(
    auth: AuthUser,
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, AppError> {
    auth.require_admin()?;

    let image = upload::parse_multipart(&headers, body)
        .await
        .map_err(AppError::BadRequest)?;

    let image_path = upload::store(&state.config.upload_dir, &image)
        .await
        .map_err(AppError::Internal)?;

    tracing::info!(
        user_id = %auth.user_id,
        key = %image.key,
        size = image.bytes.len(),
        "Image uploaded to {image_path}"
    );

    Ok(Json(UploadResponse {
        success: true,
        image_path: Some(image_path),
        message: Some("Image uploaded".to_string()),
    }))
}
