//! Image uploads for editable fragments.

use std::path::Path;

use axum::http::HeaderMap;
use bytes::Bytes;
use uuid::Uuid;

use crate::content::ContentKey;

/// URL prefix under which the upload directory is served.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug)]
pub struct ImageUpload {
    pub key: ContentKey,
    pub extension: &'static str,
    pub bytes: Bytes,
}

/// Parse the `{image, section, element_id}` multipart form.
pub async fn parse_multipart(headers: &HeaderMap, body: Bytes) -> Result<ImageUpload, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut section = None;
    let mut element_id = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "section" => section = Some(read_text(field).await?),
            "element_id" => element_id = Some(read_text(field).await?),
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .map(|m| m.essence_str().to_string())
                    .unwrap_or_default();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Field read error: {e}"))?;
                image = Some((file_name, content_type, bytes));
            }
            _ => {}
        }
    }

    let key = ContentKey::new(
        section.ok_or_else(|| "Missing section".to_string())?,
        element_id.ok_or_else(|| "Missing element_id".to_string())?,
    );
    key.validate()?;

    let (file_name, content_type, bytes) = image.ok_or_else(|| "No image provided".to_string())?;
    if bytes.is_empty() {
        return Err("No image provided".to_string());
    }
    let extension = image_extension(&file_name, &content_type, &bytes)?;

    Ok(ImageUpload {
        key,
        extension,
        bytes,
    })
}

async fn read_text(field: multer::Field<'_>) -> Result<String, String> {
    field
        .text()
        .await
        .map(|s| s.trim().to_string())
        .map_err(|e| format!("Field read error: {e}"))
}

/// Accepted extension for the file, checked against its declared type and
/// its leading bytes.
pub fn image_extension(
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> Result<&'static str, String> {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let extension = match ext.as_str() {
        "jpg" | "jpeg" => "jpg",
        "png" => "png",
        "gif" => "gif",
        "webp" => "webp",
        _ => return Err("Only JPG, PNG, GIF and WEBP images are allowed".to_string()),
    };

    if !content_type.is_empty() && !content_type.starts_with("image/") {
        return Err("Only image files are allowed".to_string());
    }

    let signature_ok = match extension {
        "jpg" => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
        "png" => bytes.starts_with(&[0x89, b'P', b'N', b'G']),
        "gif" => bytes.starts_with(b"GIF8"),
        "webp" => bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP",
        _ => false,
    };
    if !signature_ok {
        return Err("File content does not match its extension".to_string());
    }

    Ok(extension)
}

/// Write the image under `dir` and return its public path.
pub async fn store(dir: &Path, upload: &ImageUpload) -> Result<String, String> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| format!("Failed to create upload directory: {e}"))?;

    let file_name = format!(
        "{}-{}-{}.{}",
        upload.key.section,
        upload.key.element_id,
        Uuid::now_v7().simple(),
        upload.extension
    );
    tokio::fs::write(dir.join(&file_name), &upload.bytes)
        .await
        .map_err(|e| format!("Failed to write upload: {e}"))?;

    Ok(format!("{PUBLIC_PREFIX}/{file_name}"))
}
