//! Team member data-access service.
//!
//! CRUD over team members plus the fixed two-person seed policy. Skill edits
//! are read-modify-write cycles over the whole skills list.

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{slugify, CreateMemberRequest, TeamMember, UpdateMemberRequest};

/// Team members and the seed roster.
pub struct TeamService {
    repo: Repository,
}

impl TeamService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// All members, oldest first.
    pub async fn list_members(&self) -> Result<Vec<TeamMember>, AppError> {
        self.repo.list_members().await
    }

    pub async fn get_member(&self, id: &str) -> Result<Option<TeamMember>, AppError> {
        self.repo.get_member(id).await
    }

    pub async fn get_member_by_name(&self, name: &str) -> Result<Option<TeamMember>, AppError> {
        self.repo.get_member_by_name(name).await
    }

    /// Create a member. The id is chosen by the caller and must be a slug.
    pub async fn create_member(
        &self,
        request: &CreateMemberRequest,
    ) -> Result<TeamMember, AppError> {
        if request.id.is_empty() || slugify(&request.id) != request.id {
            return Err(AppError::Validation(format!(
                "Member id {:?} must be a lowercase slug",
                request.id
            )));
        }
        if request.name.trim().is_empty() {
            return Err(AppError::Validation("Member name is required".to_string()));
        }

        self.repo.create_member(request).await
    }

    /// Partial update; only the update timestamp is re-stamped.
    pub async fn update_member(
        &self,
        id: &str,
        request: &UpdateMemberRequest,
    ) -> Result<TeamMember, AppError> {
        self.repo.update_member(id, request).await
    }

    pub async fn delete_member(&self, id: &str) -> Result<(), AppError> {
        self.repo.delete_member(id).await
    }

    /// Append a skill if the member does not already have it.
    pub async fn add_skill(&self, id: &str, skill: &str) -> Result<TeamMember, AppError> {
        let skill = skill.trim();
        if skill.is_empty() {
            return Err(AppError::Validation("Skill is required".to_string()));
        }

        let member = self.require_member(id).await?;
        let mut skills = member.skills;
        if !skills.iter().any(|s| s == skill) {
            skills.push(skill.to_string());
        }

        self.write_skills(id, skills).await
    }

    /// Remove every occurrence of a skill.
    pub async fn remove_skill(&self, id: &str, skill: &str) -> Result<TeamMember, AppError> {
        let member = self.require_member(id).await?;
        let mut skills = member.skills;
        skills.retain(|s| s != skill);

        self.write_skills(id, skills).await
    }

    /// Rename a skill in place, keeping its position in the list.
    pub async fn rename_skill(
        &self,
        id: &str,
        from: &str,
        to: &str,
    ) -> Result<TeamMember, AppError> {
        let to = to.trim();
        if to.is_empty() {
            return Err(AppError::Validation("Skill is required".to_string()));
        }

        let member = self.require_member(id).await?;
        let mut skills = member.skills;
        let position = skills
            .iter()
            .position(|s| s == from)
            .ok_or_else(|| AppError::NotFound(format!("Member {} has no skill {:?}", id, from)))?;
        skills[position] = to.to_string();

        self.write_skills(id, skills).await
    }

    /// Create the two fixed members when the table is empty.
    pub async fn ensure_seed_members(&self) -> Result<bool, AppError> {
        if !self.repo.list_members().await?.is_empty() {
            return Ok(false);
        }

        for request in seed_members() {
            self.repo.create_member(&request).await?;
        }
        tracing::info!("Seeded default team members");
        Ok(true)
    }

    async fn require_member(&self, id: &str) -> Result<TeamMember, AppError> {
        self.repo
            .get_member(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))
    }

    async fn write_skills(&self, id: &str, skills: Vec<String>) -> Result<TeamMember, AppError> {
        self.repo
            .update_member(
                id,
                &UpdateMemberRequest {
                    skills: Some(skills),
                    ..Default::default()
                },
            )
            .await
    }
}

fn seed_members() -> Vec<CreateMemberRequest> {
    vec![
        CreateMemberRequest {
            id: "ariana".to_string(),
            name: "Ariana".to_string(),
            role: "Creative Director".to_string(),
            avatar: None,
            bio: "Leads brand strategy and art direction across every engagement."
                .to_string(),
            skills: vec![
                "Brand Strategy".to_string(),
                "Art Direction".to_string(),
                "Typography".to_string(),
            ],
        },
        CreateMemberRequest {
            id: "cooper".to_string(),
            name: "Cooper".to_string(),
            role: "Design Engineer".to_string(),
            avatar: None,
            bio: "Builds the interactive side of the studio's work, from prototypes to \
                  production sites."
                .to_string(),
            skills: vec![
                "Interaction Design".to_string(),
                "Frontend Engineering".to_string(),
                "Motion".to_string(),
            ],
        },
    ]
}
