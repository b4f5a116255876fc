//! Site content API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{ContentEntry, SetContentRequest};
use crate::AppState;

/// GET /api/content/:key - Get a content blob.
pub async fn get_content(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<ContentEntry> {
    match state.content.get(&key).await? {
        Some(entry) => success(entry),
        None => Err(AppError::NotFound(format!("Content {} not found", key))),
    }
}

/// PUT /api/content/:key - Replace a content blob.
pub async fn put_content(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<SetContentRequest>,
) -> ApiResult<ContentEntry> {
    success(state.content.set(&key, &request.value).await?)
}
