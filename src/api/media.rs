//! Media upload API endpoints.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::media::MediaStore;
use crate::AppState;

/// Response body for a successful upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
}

/// Request body for deleting a stored image.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMediaRequest {
    pub url: String,
}

/// POST /api/media - Upload an image.
///
/// Multipart fields: `file` (required), `name` (optional stored filename),
/// `replaces` (optional URL of the image this upload supersedes).
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let mut file: Option<(Vec<u8>, String, String)> = None;
    let mut name: Option<String> = None;
    let mut replaces: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let original_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                file = Some((bytes.to_vec(), original_name, content_type));
            }
            "name" => name = Some(field.text().await.map_err(bad_multipart)?),
            "replaces" => replaces = Some(field.text().await.map_err(bad_multipart)?),
            _ => {}
        }
    }

    let (bytes, original_name, content_type) =
        file.ok_or_else(|| AppError::Validation("A file field is required".to_string()))?;

    MediaStore::validate_image(&content_type, bytes.len() as u64)?;

    let url = match replaces {
        Some(old_url) => {
            state
                .media
                .replace(&old_url, &bytes, &original_name, name.as_deref())
                .await?
        }
        None => {
            state
                .media
                .store(&bytes, &original_name, name.as_deref())
                .await?
        }
    };

    success(UploadResponse { url })
}

/// DELETE /api/media - Delete a stored image by public URL.
pub async fn delete_image(
    State(state): State<AppState>,
    Json(request): Json<DeleteMediaRequest>,
) -> ApiResult<()> {
    state.media.remove(&request.url).await?;
    success(())
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Malformed multipart request: {}", err))
}
