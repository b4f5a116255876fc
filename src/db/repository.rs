//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    Category, ContentEntry, CreateMemberRequest, CreateProjectRequest, Project, Tag, TeamMember,
    UpdateCategoryRequest, UpdateMemberRequest, UpdateProjectRequest, UpdateTagRequest,
};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== PROJECT OPERATIONS ====================

    /// List all projects, newest first.
    pub async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let rows = sqlx::query(
            "SELECT id, title, category, description, image, tags, featured, year, view_url, created_at, updated_at \
             FROM projects ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(project_from_row).collect())
    }

    /// List projects in a category, newest first.
    pub async fn list_projects_by_category(&self, category: &str) -> Result<Vec<Project>, AppError> {
        let rows = sqlx::query(
            "SELECT id, title, category, description, image, tags, featured, year, view_url, created_at, updated_at \
             FROM projects WHERE category = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(project_from_row).collect())
    }

    /// List featured projects, newest first.
    pub async fn list_featured_projects(&self) -> Result<Vec<Project>, AppError> {
        let rows = sqlx::query(
            "SELECT id, title, category, description, image, tags, featured, year, view_url, created_at, updated_at \
             FROM projects WHERE featured = 1 ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(project_from_row).collect())
    }

    /// Get a project by ID.
    pub async fn get_project(&self, id: i64) -> Result<Option<Project>, AppError> {
        let row = sqlx::query(
            "SELECT id, title, category, description, image, tags, featured, year, view_url, created_at, updated_at \
             FROM projects WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(project_from_row))
    }

    /// Create a new project, stamping both timestamps.
    pub async fn create_project(&self, request: &CreateProjectRequest) -> Result<Project, AppError> {
        let now = Utc::now().to_rfc3339();
        let tags_json = serde_json::to_string(&request.tags).unwrap_or_default();

        let result = sqlx::query(
            "INSERT INTO projects (title, category, description, image, tags, featured, year, view_url, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&request.title)
        .bind(&request.category)
        .bind(&request.description)
        .bind(&request.image)
        .bind(&tags_json)
        .bind(request.featured as i32)
        .bind(&request.year)
        .bind(&request.view_url)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Project {
            id: result.last_insert_rowid(),
            title: request.title.clone(),
            category: request.category.clone(),
            description: request.description.clone(),
            image: request.image.clone(),
            tags: request.tags.clone(),
            featured: request.featured,
            year: request.year.clone(),
            view_url: request.view_url.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Partially update a project, re-stamping only the update timestamp.
    /// Last write wins; there is no concurrency token.
    pub async fn update_project(
        &self,
        id: i64,
        request: &UpdateProjectRequest,
    ) -> Result<Project, AppError> {
        let existing = self
            .get_project(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))?;

        let now = Utc::now().to_rfc3339();

        let title = request.title.as_ref().unwrap_or(&existing.title);
        let category = request.category.as_ref().unwrap_or(&existing.category);
        let description = request.description.as_ref().unwrap_or(&existing.description);
        let image = request.image.clone().or(existing.image.clone());
        let tags = request.tags.clone().unwrap_or(existing.tags.clone());
        let featured = request.featured.unwrap_or(existing.featured);
        let year = request.year.as_ref().unwrap_or(&existing.year);
        let view_url = request.view_url.clone().or(existing.view_url.clone());
        let tags_json = serde_json::to_string(&tags).unwrap_or_default();

        sqlx::query(
            "UPDATE projects SET title = ?, category = ?, description = ?, image = ?, tags = ?, \
             featured = ?, year = ?, view_url = ?, updated_at = ? WHERE id = ?",
        )
        .bind(title)
        .bind(category)
        .bind(description)
        .bind(&image)
        .bind(&tags_json)
        .bind(featured as i32)
        .bind(year)
        .bind(&view_url)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Project {
            id,
            title: title.clone(),
            category: category.clone(),
            description: description.clone(),
            image,
            tags,
            featured,
            year: year.clone(),
            view_url,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Hard-delete a project.
    pub async fn delete_project(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Project {} not found", id)));
        }

        Ok(())
    }

    /// Replace the whole project table with the given records.
    ///
    /// The delete and every insert run in one transaction; a failure in either
    /// phase rolls back and leaves the previous data fully intact.
    pub async fn replace_all_projects(
        &self,
        requests: &[CreateProjectRequest],
    ) -> Result<Vec<Project>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM projects").execute(&mut *tx).await?;

        let mut inserted = Vec::with_capacity(requests.len());
        for request in requests {
            let now = Utc::now().to_rfc3339();
            let tags_json = serde_json::to_string(&request.tags).unwrap_or_default();

            let result = sqlx::query(
                "INSERT INTO projects (title, category, description, image, tags, featured, year, view_url, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&request.title)
            .bind(&request.category)
            .bind(&request.description)
            .bind(&request.image)
            .bind(&tags_json)
            .bind(request.featured as i32)
            .bind(&request.year)
            .bind(&request.view_url)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

            inserted.push(Project {
                id: result.last_insert_rowid(),
                title: request.title.clone(),
                category: request.category.clone(),
                description: request.description.clone(),
                image: request.image.clone(),
                tags: request.tags.clone(),
                featured: request.featured,
                year: request.year.clone(),
                view_url: request.view_url.clone(),
                created_at: now.clone(),
                updated_at: now,
            });
        }

        tx.commit().await?;

        Ok(inserted)
    }

    /// Count projects referencing a category slug.
    pub async fn count_projects_in_category(&self, category: &str) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM projects WHERE category = ?")
            .bind(category)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// Count projects whose tag list contains the given tag name.
    pub async fn count_projects_with_tag(&self, name: &str) -> Result<i64, AppError> {
        let projects = self.list_projects().await?;
        Ok(projects
            .iter()
            .filter(|p| p.tags.iter().any(|t| t == name))
            .count() as i64)
    }

    // ==================== CATEGORY OPERATIONS ====================

    /// List all categories.
    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query("SELECT id, label, color FROM categories ORDER BY label")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(category_from_row).collect())
    }

    /// Get a category by ID.
    pub async fn get_category(&self, id: &str) -> Result<Option<Category>, AppError> {
        let row = sqlx::query("SELECT id, label, color FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(category_from_row))
    }

    /// Create a new category with a pre-derived slug id.
    pub async fn create_category(&self, category: &Category) -> Result<Category, AppError> {
        if self.get_category(&category.id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Category {} already exists",
                category.id
            )));
        }

        sqlx::query("INSERT INTO categories (id, label, color) VALUES (?, ?, ?)")
            .bind(&category.id)
            .bind(&category.label)
            .bind(&category.color)
            .execute(&self.pool)
            .await?;

        Ok(category.clone())
    }

    /// Update a category's label or color. The slug id never changes.
    pub async fn update_category(
        &self,
        id: &str,
        request: &UpdateCategoryRequest,
    ) -> Result<Category, AppError> {
        let existing = self
            .get_category(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        let label = request.label.as_ref().unwrap_or(&existing.label);
        let color = request.color.as_ref().unwrap_or(&existing.color);

        sqlx::query("UPDATE categories SET label = ?, color = ? WHERE id = ?")
            .bind(label)
            .bind(color)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Category {
            id: id.to_string(),
            label: label.clone(),
            color: color.clone(),
        })
    }

    /// Delete a category, leaving any project references dangling.
    pub async fn delete_category(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        Ok(())
    }

    /// Delete a category and clear it from every referencing project, atomically.
    pub async fn delete_category_cascade(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now().to_rfc3339();

        sqlx::query("UPDATE projects SET category = '', updated_at = ? WHERE category = ?")
            .bind(&now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }

    // ==================== TAG OPERATIONS ====================

    /// List all tags.
    pub async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        let rows = sqlx::query("SELECT id, name, color FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(tag_from_row).collect())
    }

    /// Get a tag by ID.
    pub async fn get_tag(&self, id: &str) -> Result<Option<Tag>, AppError> {
        let row = sqlx::query("SELECT id, name, color FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(tag_from_row))
    }

    /// Create a new tag with a pre-derived slug id.
    pub async fn create_tag(&self, tag: &Tag) -> Result<Tag, AppError> {
        if self.get_tag(&tag.id).await?.is_some() {
            return Err(AppError::Conflict(format!("Tag {} already exists", tag.id)));
        }

        sqlx::query("INSERT INTO tags (id, name, color) VALUES (?, ?, ?)")
            .bind(&tag.id)
            .bind(&tag.name)
            .bind(&tag.color)
            .execute(&self.pool)
            .await?;

        Ok(tag.clone())
    }

    /// Update a tag's name or color. The slug id never changes.
    pub async fn update_tag(&self, id: &str, request: &UpdateTagRequest) -> Result<Tag, AppError> {
        let existing = self
            .get_tag(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {} not found", id)))?;

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let color = request.color.as_ref().unwrap_or(&existing.color);

        sqlx::query("UPDATE tags SET name = ?, color = ? WHERE id = ?")
            .bind(name)
            .bind(color)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Tag {
            id: id.to_string(),
            name: name.clone(),
            color: color.clone(),
        })
    }

    /// Delete a tag, leaving any project references dangling.
    pub async fn delete_tag(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Tag {} not found", id)));
        }

        Ok(())
    }

    /// Delete a tag and remove its name from every project's tag list, atomically.
    pub async fn delete_tag_cascade(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let tag_row = sqlx::query("SELECT id, name, color FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let tag = tag_row
            .as_ref()
            .map(tag_from_row)
            .ok_or_else(|| AppError::NotFound(format!("Tag {} not found", id)))?;

        let now = Utc::now().to_rfc3339();
        let rows = sqlx::query("SELECT id, tags FROM projects")
            .fetch_all(&mut *tx)
            .await?;

        for row in rows {
            let project_id: i64 = row.get("id");
            let tags_str: Option<String> = row.get("tags");
            let mut tags = tags_str.map(|s| parse_json_array(&s)).unwrap_or_default();

            if tags.iter().any(|t| t == &tag.name) {
                tags.retain(|t| t != &tag.name);
                let tags_json = serde_json::to_string(&tags).unwrap_or_default();
                sqlx::query("UPDATE projects SET tags = ?, updated_at = ? WHERE id = ?")
                    .bind(&tags_json)
                    .bind(&now)
                    .bind(project_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ==================== MEMBER OPERATIONS ====================

    /// List all members, oldest first.
    pub async fn list_members(&self) -> Result<Vec<TeamMember>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, role, avatar, bio, skills, created_at, updated_at \
             FROM members ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(member_from_row).collect())
    }

    /// Get a member by ID.
    pub async fn get_member(&self, id: &str) -> Result<Option<TeamMember>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, role, avatar, bio, skills, created_at, updated_at \
             FROM members WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(member_from_row))
    }

    /// Get a member by display name.
    pub async fn get_member_by_name(&self, name: &str) -> Result<Option<TeamMember>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, role, avatar, bio, skills, created_at, updated_at \
             FROM members WHERE name = ? LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(member_from_row))
    }

    /// Create a new member with a client-chosen id, stamping both timestamps.
    pub async fn create_member(
        &self,
        request: &CreateMemberRequest,
    ) -> Result<TeamMember, AppError> {
        if self.get_member(&request.id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Member {} already exists",
                request.id
            )));
        }

        let now = Utc::now().to_rfc3339();
        let skills_json = serde_json::to_string(&request.skills).unwrap_or_default();

        sqlx::query(
            "INSERT INTO members (id, name, role, avatar, bio, skills, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&request.id)
        .bind(&request.name)
        .bind(&request.role)
        .bind(&request.avatar)
        .bind(&request.bio)
        .bind(&skills_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(TeamMember {
            id: request.id.clone(),
            name: request.name.clone(),
            role: request.role.clone(),
            avatar: request.avatar.clone(),
            bio: request.bio.clone(),
            skills: request.skills.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Partially update a member, re-stamping only the update timestamp.
    pub async fn update_member(
        &self,
        id: &str,
        request: &UpdateMemberRequest,
    ) -> Result<TeamMember, AppError> {
        let existing = self
            .get_member(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))?;

        let now = Utc::now().to_rfc3339();

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let role = request.role.as_ref().unwrap_or(&existing.role);
        let avatar = request.avatar.clone().or(existing.avatar.clone());
        let bio = request.bio.as_ref().unwrap_or(&existing.bio);
        let skills = request.skills.clone().unwrap_or(existing.skills.clone());
        let skills_json = serde_json::to_string(&skills).unwrap_or_default();

        sqlx::query(
            "UPDATE members SET name = ?, role = ?, avatar = ?, bio = ?, skills = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(name)
        .bind(role)
        .bind(&avatar)
        .bind(bio)
        .bind(&skills_json)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(TeamMember {
            id: id.to_string(),
            name: name.clone(),
            role: role.clone(),
            avatar,
            bio: bio.clone(),
            skills,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Hard-delete a member.
    pub async fn delete_member(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member {} not found", id)));
        }

        Ok(())
    }

    // ==================== CONTENT OPERATIONS ====================

    /// Get a content blob by key.
    pub async fn get_content(&self, key: &str) -> Result<Option<ContentEntry>, AppError> {
        let row = sqlx::query("SELECT key, value, updated_at FROM content WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(content_from_row))
    }

    /// Upsert a content blob, replacing the whole value.
    pub async fn set_content(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<ContentEntry, AppError> {
        let now = Utc::now().to_rfc3339();
        let value_json = serde_json::to_string(value)?;

        sqlx::query(
            "INSERT INTO content (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(&value_json)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(ContentEntry {
            key: key.to_string(),
            value: value.clone(),
            updated_at: now,
        })
    }
}

// Helper functions for row conversion

fn project_from_row(row: &sqlx::sqlite::SqliteRow) -> Project {
    let featured: i32 = row.get("featured");
    let tags_str: Option<String> = row.get("tags");
    Project {
        id: row.get("id"),
        title: row.get("title"),
        category: row.get("category"),
        description: row.get("description"),
        image: row.get("image"),
        tags: tags_str.map(|s| parse_json_array(&s)).unwrap_or_default(),
        featured: featured != 0,
        year: row.get("year"),
        view_url: row.get("view_url"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn category_from_row(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        label: row.get("label"),
        color: row.get("color"),
    }
}

fn tag_from_row(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
        color: row.get("color"),
    }
}

fn member_from_row(row: &sqlx::sqlite::SqliteRow) -> TeamMember {
    let skills_str: Option<String> = row.get("skills");
    TeamMember {
        id: row.get("id"),
        name: row.get("name"),
        role: row.get("role"),
        avatar: row.get("avatar"),
        bio: row.get("bio"),
        skills: skills_str.map(|s| parse_json_array(&s)).unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn content_from_row(row: &sqlx::sqlite::SqliteRow) -> ContentEntry {
    let value_str: String = row.get("value");
    ContentEntry {
        key: row.get("key"),
        value: serde_json::from_str(&value_str).unwrap_or(serde_json::Value::Null),
        updated_at: row.get("updated_at"),
    }
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}
