//! Portfolio data-access service.
//!
//! CRUD and query operations over projects and their two taxonomies, with a
//! TTL read cache over the three list operations. Every successful write
//! invalidates the whole cache.

use std::time::Duration;

use crate::cache::CatalogCache;
use crate::config::TaxonomyDeletePolicy;
use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{
    slugify, Category, CreateCategoryRequest, CreateProjectRequest, CreateTagRequest, Project,
    ProjectCard, Tag, UpdateCategoryRequest, UpdateProjectRequest, UpdateTagRequest,
};

/// Color returned for lookups that miss the taxonomy tables.
pub const NEUTRAL_COLOR: &str = "#9CA3AF";

/// Category filter value that bypasses filtering entirely.
pub const ALL_CATEGORIES: &str = "all";

/// Portfolio projects, categories, tags, and their read cache.
pub struct PortfolioService {
    repo: Repository,
    cache: CatalogCache,
    delete_policy: TaxonomyDeletePolicy,
}

impl PortfolioService {
    pub fn new(repo: Repository, cache_ttl: Duration, delete_policy: TaxonomyDeletePolicy) -> Self {
        Self {
            repo,
            cache: CatalogCache::new(cache_ttl),
            delete_policy,
        }
    }

    // ==================== PROJECT OPERATIONS ====================

    /// All projects, newest first. Served from the cache while its projects
    /// slot is fresh.
    pub async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        if let Some(cached) = self.cache.projects() {
            return Ok(cached);
        }

        let projects = self.repo.list_projects().await?;
        self.cache.put_projects(projects.clone());
        Ok(projects)
    }

    /// Projects filtered by category. `"all"` bypasses the filter. Uncached.
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Project>, AppError> {
        if category == ALL_CATEGORIES {
            return self.list_projects().await;
        }
        self.repo.list_projects_by_category(category).await
    }

    /// Featured projects only. Uncached.
    pub async fn list_featured(&self) -> Result<Vec<Project>, AppError> {
        self.repo.list_featured_projects().await
    }

    /// Single project lookup.
    pub async fn get_project(&self, id: i64) -> Result<Option<Project>, AppError> {
        self.repo.get_project(id).await
    }

    /// Create a project; both timestamps are stamped server-side.
    pub async fn create_project(
        &self,
        request: &CreateProjectRequest,
    ) -> Result<Project, AppError> {
        validate_project(request)?;
        let project = self.repo.create_project(request).await?;
        self.cache.invalidate();
        Ok(project)
    }

    /// Partial update; only the update timestamp is re-stamped.
    pub async fn update_project(
        &self,
        id: i64,
        request: &UpdateProjectRequest,
    ) -> Result<Project, AppError> {
        let project = self.repo.update_project(id, request).await?;
        self.cache.invalidate();
        Ok(project)
    }

    /// Hard delete. A second delete of the same id reports NotFound.
    pub async fn delete_project(&self, id: i64) -> Result<(), AppError> {
        self.repo.delete_project(id).await?;
        self.cache.invalidate();
        Ok(())
    }

    /// Replace the whole project table atomically.
    pub async fn replace_all(
        &self,
        requests: &[CreateProjectRequest],
    ) -> Result<Vec<Project>, AppError> {
        for request in requests {
            validate_project(request)?;
        }

        let projects = self.repo.replace_all_projects(requests).await?;
        self.cache.invalidate();
        Ok(projects)
    }

    /// Insert one sample project when the table is empty, so a fresh install
    /// renders a non-empty portfolio.
    pub async fn ensure_seed_projects(&self) -> Result<bool, AppError> {
        if !self.repo.list_projects().await?.is_empty() {
            return Ok(false);
        }

        let sample = CreateProjectRequest {
            title: "Aurora Identity System".to_string(),
            category: "branding".to_string(),
            description: "Naming, visual identity, and print collateral for the Aurora \
                          residency program."
                .to_string(),
            image: None,
            tags: vec!["identity".to_string(), "print".to_string()],
            featured: true,
            year: "2024".to_string(),
            view_url: None,
        };

        self.create_project(&sample).await?;
        tracing::info!("Seeded sample portfolio project");
        Ok(true)
    }

    // ==================== TAXONOMY OPERATIONS ====================

    /// All categories, cached on their own staleness clock.
    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        if let Some(cached) = self.cache.categories() {
            return Ok(cached);
        }

        let categories = self.repo.list_categories().await?;
        self.cache.put_categories(categories.clone());
        Ok(categories)
    }

    /// All tags, cached on their own staleness clock.
    pub async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        if let Some(cached) = self.cache.tags() {
            return Ok(cached);
        }

        let tags = self.repo.list_tags().await?;
        self.cache.put_tags(tags.clone());
        Ok(tags)
    }

    /// Create a category; the id is the slugified label.
    pub async fn create_category(
        &self,
        request: &CreateCategoryRequest,
    ) -> Result<Category, AppError> {
        let label = request.label.trim();
        let id = slugify(label);
        if id.is_empty() {
            return Err(AppError::Validation(
                "Category label must contain letters or digits".to_string(),
            ));
        }
        if request.color.trim().is_empty() {
            return Err(AppError::Validation("Category color is required".to_string()));
        }

        let category = self
            .repo
            .create_category(&Category {
                id,
                label: label.to_string(),
                color: request.color.clone(),
            })
            .await?;
        self.cache.invalidate();
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: &str,
        request: &UpdateCategoryRequest,
    ) -> Result<Category, AppError> {
        let category = self.repo.update_category(id, request).await?;
        self.cache.invalidate();
        Ok(category)
    }

    /// Delete a category according to the configured reference policy.
    pub async fn delete_category(&self, id: &str) -> Result<(), AppError> {
        match self.delete_policy {
            TaxonomyDeletePolicy::AllowOrphan => self.repo.delete_category(id).await?,
            TaxonomyDeletePolicy::Block => {
                let referenced = self.repo.count_projects_in_category(id).await?;
                if referenced > 0 {
                    return Err(AppError::Conflict(format!(
                        "Category {} is referenced by {} project(s)",
                        id, referenced
                    )));
                }
                self.repo.delete_category(id).await?
            }
            TaxonomyDeletePolicy::Cascade => self.repo.delete_category_cascade(id).await?,
        }

        self.cache.invalidate();
        Ok(())
    }

    /// Create a tag; the id is the slugified name.
    pub async fn create_tag(&self, request: &CreateTagRequest) -> Result<Tag, AppError> {
        let name = request.name.trim();
        let id = slugify(name);
        if id.is_empty() {
            return Err(AppError::Validation(
                "Tag name must contain letters or digits".to_string(),
            ));
        }
        if request.color.trim().is_empty() {
            return Err(AppError::Validation("Tag color is required".to_string()));
        }

        let tag = self
            .repo
            .create_tag(&Tag {
                id,
                name: name.to_string(),
                color: request.color.clone(),
            })
            .await?;
        self.cache.invalidate();
        Ok(tag)
    }

    pub async fn update_tag(&self, id: &str, request: &UpdateTagRequest) -> Result<Tag, AppError> {
        let tag = self.repo.update_tag(id, request).await?;
        self.cache.invalidate();
        Ok(tag)
    }

    /// Delete a tag according to the configured reference policy.
    pub async fn delete_tag(&self, id: &str) -> Result<(), AppError> {
        match self.delete_policy {
            TaxonomyDeletePolicy::AllowOrphan => self.repo.delete_tag(id).await?,
            TaxonomyDeletePolicy::Block => {
                let tag = self
                    .repo
                    .get_tag(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Tag {} not found", id)))?;
                let referenced = self.repo.count_projects_with_tag(&tag.name).await?;
                if referenced > 0 {
                    return Err(AppError::Conflict(format!(
                        "Tag {} is referenced by {} project(s)",
                        id, referenced
                    )));
                }
                self.repo.delete_tag(id).await?
            }
            TaxonomyDeletePolicy::Cascade => self.repo.delete_tag_cascade(id).await?,
        }

        self.cache.invalidate();
        Ok(())
    }

    // ==================== SYNCHRONOUS LOOKUPS ====================

    /// Color for a category slug from the cached taxonomy list. Never fetches;
    /// a cold cache or unknown slug yields the neutral color.
    pub fn color_for_category(&self, category: &str) -> String {
        self.cache
            .peek_categories()
            .and_then(|categories| {
                categories
                    .iter()
                    .find(|c| c.id == category)
                    .map(|c| c.color.clone())
            })
            .unwrap_or_else(|| NEUTRAL_COLOR.to_string())
    }

    /// Display label for a category slug. Falls back to the raw slug when the
    /// cache is cold rather than forcing a fetch.
    pub fn label_for_category(&self, category: &str) -> String {
        self.cache
            .peek_categories()
            .and_then(|categories| {
                categories
                    .iter()
                    .find(|c| c.id == category)
                    .map(|c| c.label.clone())
            })
            .unwrap_or_else(|| category.to_string())
    }

    /// Color for a tag name from the cached taxonomy list.
    pub fn color_for_tag(&self, name: &str) -> String {
        self.cache
            .peek_tags()
            .and_then(|tags| tags.iter().find(|t| t.name == name).map(|t| t.color.clone()))
            .unwrap_or_else(|| NEUTRAL_COLOR.to_string())
    }

    /// Projects decorated with category label/color and tag colors for the
    /// site grid. Warms the caches via the list operations first.
    pub async fn list_cards(&self) -> Result<Vec<ProjectCard>, AppError> {
        let projects = self.list_projects().await?;
        self.list_categories().await?;
        self.list_tags().await?;

        Ok(projects
            .into_iter()
            .map(|project| ProjectCard {
                category_label: self.label_for_category(&project.category),
                category_color: self.color_for_category(&project.category),
                tag_colors: project
                    .tags
                    .iter()
                    .map(|tag| self.color_for_tag(tag))
                    .collect(),
                project,
            })
            .collect())
    }
}

fn validate_project(request: &CreateProjectRequest) -> Result<(), AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Project title is required".to_string()));
    }
    if request.category.trim().is_empty() {
        return Err(AppError::Validation(
            "Project category is required".to_string(),
        ));
    }
    Ok(())
}
