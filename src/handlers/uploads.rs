// src/handlers/uploads.rs

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{config::Config, error::AppError};

/// Maximum accepted upload size (5 MB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Accepted image MIME types and the file extension stored on disk.
const ALLOWED_IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

fn map_multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Image exceeds the 5MB upload limit".to_string())
    } else {
        AppError::BadRequest(format!("Invalid multipart upload: {e}"))
    }
}

/// Accepts a cover image as multipart form data (field name "file"), stores
/// it under the configured upload directory and returns its public URL.
///
/// Rejects anything outside the JPEG/PNG/GIF/WebP set with 415 and anything
/// over 5 MB with 413, mirroring the validation the editor form applies
/// before uploading.
pub async fn upload_image(
    State(config): State<Config>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().map(str::to_string).unwrap_or_default();
        let Some((_, ext)) = ALLOWED_IMAGE_TYPES
            .iter()
            .find(|(mime, _)| *mime == content_type)
        else {
            return Err(AppError::UnsupportedMediaType(
                "Only JPEG, PNG, GIF and WebP images are accepted".to_string(),
            ));
        };

        let data = field.bytes().await.map_err(map_multipart_error)?;
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::PayloadTooLarge(
                "Image exceeds the 5MB upload limit".to_string(),
            ));
        }
        if data.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }

        let filename = format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            ext
        );

        tokio::fs::create_dir_all(&config.upload_dir)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        let path = std::path::Path::new(&config.upload_dir).join(&filename);
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        let url = config
            .public_base_url
            .join(&format!("uploads/{filename}"))
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        tracing::info!("Stored upload {} ({} bytes)", filename, data.len());

        return Ok(Json(serde_json::json!({ "url": url })));
    }

    Err(AppError::BadRequest(
        "Missing 'file' field in upload".to_string(),
    ))
}
