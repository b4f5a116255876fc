//! One-time import of legacy JSON exports.
//!
//! Earlier versions of the site kept portfolio and about-page data in
//! browser-exported JSON blobs. Each source file is imported through the
//! regular services and removed only after every record in it succeeded; a
//! missing or empty file is left untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{CreateMemberRequest, CreateProjectRequest};
use crate::services::{ContentService, PortfolioService, TeamService, PROFILE_KEY};

/// Legacy export of portfolio projects.
pub const LEGACY_PROJECTS_FILE: &str = "portfolio-projects.json";
/// Legacy export of the about-page profile text.
pub const LEGACY_PROFILE_FILE: &str = "about-profile.json";
/// Legacy export of the about-page team roster.
pub const LEGACY_TEAM_FILE: &str = "about-team.json";

/// A legacy project record. Client-side ids are parsed but discarded.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyProject {
    #[serde(default)]
    #[allow(dead_code)]
    id: Option<serde_json::Value>,
    title: String,
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    featured: bool,
    #[serde(default)]
    year: String,
    #[serde(default)]
    view_url: Option<String>,
}

impl LegacyProject {
    fn into_request(self) -> CreateProjectRequest {
        CreateProjectRequest {
            title: self.title,
            category: self.category,
            description: self.description,
            image: self.image,
            tags: self.tags,
            featured: self.featured,
            year: self.year,
            view_url: self.view_url,
        }
    }
}

/// A legacy roster record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyMember {
    id: String,
    name: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    bio: String,
    #[serde(default)]
    skills: Vec<String>,
}

/// What a migration run accomplished.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub projects_imported: usize,
    pub members_imported: usize,
    pub profile_imported: bool,
}

/// Imports the legacy JSON exports found in one directory.
pub struct LegacyImporter {
    portfolio: Arc<PortfolioService>,
    team: Arc<TeamService>,
    content: Arc<ContentService>,
    dir: PathBuf,
}

impl LegacyImporter {
    pub fn new(
        portfolio: Arc<PortfolioService>,
        team: Arc<TeamService>,
        content: Arc<ContentService>,
        dir: PathBuf,
    ) -> Self {
        Self {
            portfolio,
            team,
            content,
            dir,
        }
    }

    /// Run every import and report what moved.
    pub async fn run(&self) -> Result<MigrationReport, AppError> {
        Ok(MigrationReport {
            projects_imported: self.import_projects().await?,
            members_imported: self.import_team().await?,
            profile_imported: self.import_profile().await?,
        })
    }

    /// Import legacy projects, stripping their client-side ids.
    ///
    /// The file is removed only after all records inserted; a missing or
    /// empty file performs zero inserts and is not touched.
    pub async fn import_projects(&self) -> Result<usize, AppError> {
        let path = self.dir.join(LEGACY_PROJECTS_FILE);
        let Some(raw) = read_if_present(&path).await? else {
            return Ok(0);
        };

        let records: Vec<LegacyProject> = serde_json::from_slice(&raw)?;
        if records.is_empty() {
            return Ok(0);
        }

        let count = records.len();
        for record in records {
            self.portfolio.create_project(&record.into_request()).await?;
        }

        tokio::fs::remove_file(&path).await?;
        tracing::info!("Imported {} legacy projects", count);
        Ok(count)
    }

    /// Import legacy roster records whose ids are not already taken.
    pub async fn import_team(&self) -> Result<usize, AppError> {
        let path = self.dir.join(LEGACY_TEAM_FILE);
        let Some(raw) = read_if_present(&path).await? else {
            return Ok(0);
        };

        let records: Vec<LegacyMember> = serde_json::from_slice(&raw)?;
        if records.is_empty() {
            return Ok(0);
        }

        let mut imported = 0;
        for record in records {
            if self.team.get_member(&record.id).await?.is_some() {
                tracing::debug!("Skipping legacy member {}: id already exists", record.id);
                continue;
            }
            self.team
                .create_member(&CreateMemberRequest {
                    id: record.id,
                    name: record.name,
                    role: record.role,
                    avatar: record.avatar,
                    bio: record.bio,
                    skills: record.skills,
                })
                .await?;
            imported += 1;
        }

        tokio::fs::remove_file(&path).await?;
        tracing::info!("Imported {} legacy team members", imported);
        Ok(imported)
    }

    /// Import the legacy profile text into the content table.
    pub async fn import_profile(&self) -> Result<bool, AppError> {
        let path = self.dir.join(LEGACY_PROFILE_FILE);
        let Some(raw) = read_if_present(&path).await? else {
            return Ok(false);
        };

        let value: serde_json::Value = serde_json::from_slice(&raw)?;
        self.content.set(PROFILE_KEY, &value).await?;

        tokio::fs::remove_file(&path).await?;
        tracing::info!("Imported legacy profile content");
        Ok(true)
    }
}

async fn read_if_present(path: &Path) -> Result<Option<Vec<u8>>, AppError> {
    match tokio::fs::read(path).await {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}
