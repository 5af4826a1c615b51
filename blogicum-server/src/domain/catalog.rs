use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

pub(crate) const MAX_TITLE_LEN: usize = 256;
pub(crate) const MAX_LOCATION_NAME_LEN: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Category {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) slug: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl Category {
    pub(crate) fn to_ref(&self) -> CategoryRef {
        CategoryRef {
            id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            is_published: self.is_published,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CategoryRef {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Location {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl Location {
    pub(crate) fn to_ref(&self) -> LocationRef {
        LocationRef {
            id: self.id,
            name: self.name.clone(),
            is_published: self.is_published,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LocationRef {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) is_published: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NewCategory {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) slug: String,
    #[serde(default = "default_published")]
    pub(crate) is_published: bool,
}

impl NewCategory {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let title = self.title.trim();
        if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::Validation {
                field: "title",
                message: "must be 1..256 chars",
            });
        }

        let description = self.description.trim();
        if description.is_empty() {
            return Err(DomainError::Validation {
                field: "description",
                message: "must not be empty",
            });
        }

        let slug = self.slug.trim();
        if !is_valid_slug(slug) {
            return Err(DomainError::Validation {
                field: "slug",
                message: "must contain only latin letters, digits, '-' and '_'",
            });
        }

        Ok(Self {
            title: title.to_string(),
            description: description.to_string(),
            slug: slug.to_string(),
            is_published: self.is_published,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NewLocation {
    pub(crate) name: String,
    #[serde(default = "default_published")]
    pub(crate) is_published: bool,
}

impl NewLocation {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > MAX_LOCATION_NAME_LEN {
            return Err(DomainError::Validation {
                field: "name",
                message: "must be 1..20 chars",
            });
        }
        Ok(Self {
            name: name.to_string(),
            is_published: self.is_published,
        })
    }
}

pub(crate) fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn default_published() -> bool {
    true
}
