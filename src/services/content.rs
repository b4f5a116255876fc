//! Keyed site-content service.
//!
//! The database is the single authoritative store for editable site copy;
//! writes replace the whole value under a key.

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::ContentEntry;

/// Content key holding the about-page profile text.
pub const PROFILE_KEY: &str = "about.profile";

pub struct ContentService {
    repo: Repository,
}

impl ContentService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub async fn get(&self, key: &str) -> Result<Option<ContentEntry>, AppError> {
        self.repo.get_content(key).await
    }

    /// Replace the whole value under a key, stamping the update time.
    pub async fn set(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<ContentEntry, AppError> {
        validate_key(key)?;
        self.repo.set_content(key, value).await
    }
}

fn validate_key(key: &str) -> Result<(), AppError> {
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '_'))
    {
        return Err(AppError::Validation(format!(
            "Content key {:?} must be lowercase dotted-slug text",
            key
        )));
    }
    Ok(())
}
