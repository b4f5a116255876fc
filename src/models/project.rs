//! Portfolio project model matching the frontend Project interface.

use serde::{Deserialize, Serialize};

/// A portfolio project shown on the site and edited in the admin panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Server-assigned numeric id
    pub id: i64,
    pub title: String,
    /// Category slug; matched by name against the Category table without
    /// referential enforcement
    pub category: String,
    pub description: String,
    /// Public URL of the cover image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Free-form tag names, ordered
    #[serde(default)]
    pub tags: Vec<String>,
    pub featured: bool,
    pub year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a new project (and the unit of bulk replace).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub view_url: Option<String>,
}

/// Request body for partially updating an existing project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub view_url: Option<String>,
}

/// Request body for replacing the whole project table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceProjectsRequest {
    pub projects: Vec<CreateProjectRequest>,
}

/// A project decorated with display data for the site grid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCard {
    #[serde(flatten)]
    pub project: Project,
    pub category_label: String,
    pub category_color: String,
    /// Colors aligned index-for-index with the project's tags
    pub tag_colors: Vec<String>,
}
