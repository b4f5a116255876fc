//! Member API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    CreateMemberRequest, RenameSkillRequest, SkillRequest, TeamMember, UpdateMemberRequest,
};
use crate::AppState;

/// GET /api/members - List all members.
pub async fn list_members(State(state): State<AppState>) -> ApiResult<Vec<TeamMember>> {
    success(state.team.list_members().await?)
}

/// GET /api/members/:id - Get a single member.
pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TeamMember> {
    match state.team.get_member(&id).await? {
        Some(member) => success(member),
        None => Err(AppError::NotFound(format!("Member {} not found", id))),
    }
}

/// POST /api/members - Create a new member.
pub async fn create_member(
    State(state): State<AppState>,
    Json(request): Json<CreateMemberRequest>,
) -> ApiResult<TeamMember> {
    success(state.team.create_member(&request).await?)
}

/// PUT /api/members/:id - Partially update a member.
pub async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateMemberRequest>,
) -> ApiResult<TeamMember> {
    success(state.team.update_member(&id, &request).await?)
}

/// DELETE /api/members/:id - Delete a member.
pub async fn delete_member(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.team.delete_member(&id).await?;
    success(())
}

/// POST /api/members/:id/skills - Add one skill.
pub async fn add_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SkillRequest>,
) -> ApiResult<TeamMember> {
    success(state.team.add_skill(&id, &request.skill).await?)
}

/// DELETE /api/members/:id/skills - Remove one skill.
pub async fn remove_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SkillRequest>,
) -> ApiResult<TeamMember> {
    success(state.team.remove_skill(&id, &request.skill).await?)
}

/// PUT /api/members/:id/skills - Rename one skill in place.
pub async fn rename_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RenameSkillRequest>,
) -> ApiResult<TeamMember> {
    success(
        state
            .team
            .rename_skill(&id, &request.from, &request.to)
            .await?,
    )
}
