use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{CategoryRef, LocationRef, MAX_TITLE_LEN};
use super::error::DomainError;

const MAX_IMAGE_LEN: usize = 255;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) image: Option<String>,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) is_published: bool,
    pub(crate) author_id: i64,
    pub(crate) author_username: String,
    pub(crate) category: Option<CategoryRef>,
    pub(crate) location: Option<LocationRef>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Post {
    pub(crate) fn ensure_consistent(self) -> Result<Self, DomainError> {
        validate_positive_i64("id", self.id)?;
        validate_positive_i64("author_id", self.author_id)?;

        if self.updated_at < self.created_at {
            return Err(DomainError::Validation {
                field: "updated_at",
                message: "must be >= created_at",
            });
        }

        Ok(Self {
            title: normalize_title(&self.title)?,
            text: normalize_text(&self.text)?,
            ..self
        })
    }
}

/// Post row as shown in listings, with the number of comments at query time.
#[derive(Debug, Clone)]
pub(crate) struct PostSummary {
    pub(crate) post: Post,
    pub(crate) comment_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) image: Option<String>,
    pub(crate) pub_date: Option<DateTime<Utc>>,
    pub(crate) is_published: Option<bool>,
    pub(crate) category_id: Option<i64>,
    pub(crate) location_id: Option<i64>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            text: normalize_text(&self.text)?,
            image: normalize_image(self.image)?,
            category_id: validate_optional_id("category_id", self.category_id)?,
            location_id: validate_optional_id("location_id", self.location_id)?,
            ..self
        })
    }
}

/// Full replacement of the editable fields. Missing `pub_date` and
/// `is_published` keep their stored values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) image: Option<String>,
    pub(crate) pub_date: Option<DateTime<Utc>>,
    pub(crate) is_published: Option<bool>,
    pub(crate) category_id: Option<i64>,
    pub(crate) location_id: Option<i64>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            text: normalize_text(&self.text)?,
            image: normalize_image(self.image)?,
            category_id: validate_optional_id("category_id", self.category_id)?,
            location_id: validate_optional_id("location_id", self.location_id)?,
            ..self
        })
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

fn validate_optional_id(field: &'static str, value: Option<i64>) -> Result<Option<i64>, DomainError> {
    if let Some(id) = value {
        validate_positive_i64(field, id)?;
    }
    Ok(value)
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..256 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_text(text: &str) -> Result<String, DomainError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::Validation {
            field: "text",
            message: "must not be empty",
        });
    }
    Ok(text.to_string())
}

fn normalize_image(image: Option<String>) -> Result<Option<String>, DomainError> {
    let Some(image) = image else {
        return Ok(None);
    };
    let image = image.trim();
    if image.is_empty() {
        return Ok(None);
    }
    if image.len() > MAX_IMAGE_LEN {
        return Err(DomainError::Validation {
            field: "image",
            message: "must be at most 255 chars",
        });
    }
    Ok(Some(image.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{CreatePostRequest, DomainError, Post, UpdatePostRequest};

    #[test]
    fn create_post_request_validate_rejects_empty_title() {
        let req = CreatePostRequest {
            title: "   ".to_string(),
            ..create_request()
        };

        let err = req.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn create_post_request_validate_rejects_too_long_title() {
        let req = CreatePostRequest {
            title: "т".repeat(257),
            ..create_request()
        };

        let err = req.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn update_post_request_validate_rejects_empty_text() {
        let req = UpdatePostRequest {
            title: "valid title".to_string(),
            text: "   ".to_string(),
            image: None,
            pub_date: None,
            is_published: None,
            category_id: None,
            location_id: None,
        };

        let err = req.validate().expect_err("text must be rejected");
        assert_validation_field(err, "text");
    }

    #[test]
    fn create_post_request_validate_normalizes_fields() {
        let req = CreatePostRequest {
            title: "  title  ".to_string(),
            text: "  text  ".to_string(),
            image: Some("   ".to_string()),
            ..create_request()
        };

        let validated = req.validate().expect("must validate");
        assert_eq!(validated.title, "title");
        assert_eq!(validated.text, "text");
        assert_eq!(validated.image, None);
    }

    #[test]
    fn create_post_request_rejects_non_positive_category() {
        let req = CreatePostRequest {
            category_id: Some(0),
            ..create_request()
        };

        let err = req.validate().expect_err("category_id must be rejected");
        assert_validation_field(err, "category_id");
    }

    #[test]
    fn ensure_consistent_rejects_updated_before_created() {
        let updated_at = Utc::now();
        let post = Post {
            created_at: updated_at + Duration::seconds(1),
            updated_at,
            ..sample_post()
        };

        let err = post
            .ensure_consistent()
            .expect_err("updated_at < created_at must fail");
        assert_validation_field(err, "updated_at");
    }

    #[test]
    fn ensure_consistent_rejects_non_positive_author_id() {
        let post = Post {
            author_id: 0,
            ..sample_post()
        };

        let err = post.ensure_consistent().expect_err("author_id must be > 0");
        assert_validation_field(err, "author_id");
    }

    fn create_request() -> CreatePostRequest {
        CreatePostRequest {
            title: "title".to_string(),
            text: "text".to_string(),
            image: None,
            pub_date: None,
            is_published: None,
            category_id: None,
            location_id: None,
        }
    }

    fn sample_post() -> Post {
        let now = Utc::now();
        Post {
            id: 1,
            title: "Title".to_string(),
            text: "Text".to_string(),
            image: None,
            pub_date: now,
            is_published: true,
            author_id: 10,
            author_username: "author".to_string(),
            category: None,
            location: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
