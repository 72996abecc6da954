use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::MaterialId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MaterialError {
    #[error("material title cannot be empty")]
    EmptyTitle,

    #[error("material content cannot be empty")]
    EmptyContent,
}

/// A block of user-authored study text used as quiz generation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    pub id: MaterialId,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Material {
    /// Most recent of `created_at` / `updated_at`.
    #[must_use]
    pub fn last_changed(&self) -> DateTime<Utc> {
        self.updated_at.map_or(self.created_at, |u| u.max(self.created_at))
    }

    /// Case-insensitive search over title and content, plus an optional exact tag filter.
    #[must_use]
    pub fn matches(&self, search: &str, tag: Option<&str>) -> bool {
        let needle = search.trim().to_lowercase();
        let text_match = needle.is_empty()
            || self.title.to_lowercase().contains(&needle)
            || self.content.to_lowercase().contains(&needle);
        let tag_match = tag.is_none_or(|tag| self.tags.iter().any(|t| t == tag));
        text_match && tag_match
    }

    /// First `max_chars` characters of the content, with an ellipsis when cut.
    #[must_use]
    pub fn excerpt(&self, max_chars: usize) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}…", head.trim_end())
        } else {
            head
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl MaterialDraft {
    #[must_use]
    pub fn from_material(material: &Material) -> Self {
        Self {
            title: material.title.clone(),
            content: material.content.clone(),
            tags: material.tags.clone(),
        }
    }

    /// # Errors
    ///
    /// Returns `MaterialError` when title or content is blank.
    pub fn validate(self) -> Result<ValidatedMaterial, MaterialError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(MaterialError::EmptyTitle);
        }
        if self.content.trim().is_empty() {
            return Err(MaterialError::EmptyContent);
        }

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_owned());
            }
        }

        Ok(ValidatedMaterial {
            title: title.to_owned(),
            content: self.content,
            tags,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMaterial {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Splits a comma separated tag field.
#[must_use]
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}
