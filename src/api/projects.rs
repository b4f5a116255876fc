//! Project API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    CreateProjectRequest, Project, ProjectCard, ReplaceProjectsRequest, UpdateProjectRequest,
};
use crate::AppState;

/// Query parameters for the project list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
}

/// GET /api/projects - List projects, optionally filtered by category or featured flag.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> ApiResult<Vec<Project>> {
    let projects = if query.featured.unwrap_or(false) {
        state.portfolio.list_featured().await?
    } else if let Some(category) = query.category.as_deref() {
        state.portfolio.list_by_category(category).await?
    } else {
        state.portfolio.list_projects().await?
    };

    success(projects)
}

/// GET /api/projects/cards - List projects decorated for the site grid.
pub async fn list_project_cards(State(state): State<AppState>) -> ApiResult<Vec<ProjectCard>> {
    success(state.portfolio.list_cards().await?)
}

/// GET /api/projects/:id - Get a single project.
pub async fn get_project(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Project> {
    match state.portfolio.get_project(id).await? {
        Some(project) => success(project),
        None => Err(AppError::NotFound(format!("Project {} not found", id))),
    }
}

/// POST /api/projects - Create a new project.
pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> ApiResult<Project> {
    success(state.portfolio.create_project(&request).await?)
}

/// PUT /api/projects/:id - Partially update a project.
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateProjectRequest>,
) -> ApiResult<Project> {
    success(state.portfolio.update_project(id, &request).await?)
}

/// DELETE /api/projects/:id - Delete a project.
pub async fn delete_project(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.portfolio.delete_project(id).await?;
    success(())
}

/// PUT /api/projects - Replace the whole project table.
pub async fn replace_projects(
    State(state): State<AppState>,
    Json(request): Json<ReplaceProjectsRequest>,
) -> ApiResult<Vec<Project>> {
    success(state.portfolio.replace_all(&request.projects).await?)
}
