//! Category and tag models.
//!
//! Both are named, colored classifiers attached to projects by name, with
//! string ids derived from their display text.

use serde::{Deserialize, Serialize};

/// A project category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Slug derived from the label at creation
    pub id: String,
    pub label: String,
    /// Hex color string, e.g. "#4A90E2"
    pub color: String,
}

/// Request body for creating a new category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub label: String,
    pub color: String,
}

/// Request body for updating an existing category. The id is fixed at creation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// A free-form project tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Slug derived from the name at creation
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Request body for creating a new tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagRequest {
    pub name: String,
    pub color: String,
}

/// Request body for updating an existing tag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTagRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Derive a slug id from display text: lowercase alphanumerics joined by
/// single dashes, everything else dropped.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_simple() {
        assert_eq!(slugify("Branding"), "branding");
    }

    #[test]
    fn test_slugify_spaces_and_punctuation() {
        assert_eq!(slugify("Web & Mobile Design"), "web-mobile-design");
        assert_eq!(slugify("  Art Direction  "), "art-direction");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("a --- b"), "a-b");
    }

    #[test]
    fn test_slugify_non_ascii_dropped() {
        assert_eq!(slugify("Café Éditorial"), "caf-ditorial");
        assert_eq!(slugify("***"), "");
    }
}
