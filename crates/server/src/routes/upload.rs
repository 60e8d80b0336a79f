//! Image upload proxy (admin).

use axum::{Json, extract::Multipart, extract::State};

use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAdmin;
use crate::services::upload::{MAX_IMAGE_BYTES, UploadedImage};
use crate::state::AppState;

/// POST /upload - forward an image to the external image host.
///
/// Accepts a multipart form with one `file` field. Only image content types
/// are accepted; the host's answer (URL and id) is relayed as-is.
#[tracing::instrument(skip_all)]
pub async fn upload(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<Json<UploadedImage>> {
    let Some(client) = state.image_host() else {
        return Err(AppError::Internal("Image host is not configured".to_owned()));
    };

    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_owned();
        let content_type = field.content_type().unwrap_or("").to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;

        file = Some((file_name, content_type, bytes.to_vec()));
        break;
    }

    let Some((file_name, content_type, bytes)) = file else {
        return Err(AppError::Validation("No file provided".to_owned()));
    };

    if !content_type.starts_with("image/") {
        return Err(AppError::Validation(
            "Only image files are allowed".to_owned(),
        ));
    }

    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::Validation("File is too large".to_owned()));
    }

    let image = client
        .upload(&file_name, &content_type, bytes)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    tracing::info!(url = %image.url, "Image uploaded");

    Ok(Json(image))
}
