//! Category and tag API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::models::{
    Category, CreateCategoryRequest, CreateTagRequest, Tag, UpdateCategoryRequest,
    UpdateTagRequest,
};
use crate::AppState;

/// GET /api/categories - List all categories.
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    success(state.portfolio.list_categories().await?)
}

/// POST /api/categories - Create a new category.
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> ApiResult<Category> {
    success(state.portfolio.create_category(&request).await?)
}

/// PUT /api/categories/:id - Update a category's label or color.
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateCategoryRequest>,
) -> ApiResult<Category> {
    success(state.portfolio.update_category(&id, &request).await?)
}

/// DELETE /api/categories/:id - Delete a category per the configured policy.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.portfolio.delete_category(&id).await?;
    success(())
}

/// GET /api/tags - List all tags.
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Vec<Tag>> {
    success(state.portfolio.list_tags().await?)
}

/// POST /api/tags - Create a new tag.
pub async fn create_tag(
    State(state): State<AppState>,
    Json(request): Json<CreateTagRequest>,
) -> ApiResult<Tag> {
    success(state.portfolio.create_tag(&request).await?)
}

/// PUT /api/tags/:id - Update a tag's name or color.
pub async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTagRequest>,
) -> ApiResult<Tag> {
    success(state.portfolio.update_tag(&id, &request).await?)
}

/// DELETE /api/tags/:id - Delete a tag per the configured policy.
pub async fn delete_tag(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.portfolio.delete_tag(&id).await?;
    success(())
}
