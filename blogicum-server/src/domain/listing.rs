use chrono::{DateTime, Utc};

use super::error::DomainError;
use super::post::Post;
use super::viewer::Viewer;
use super::visibility::is_publicly_visible;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PostVisibility {
    PublicAt(DateTime<Utc>),
    Unrestricted,
}

/// Listings are ordered by `pub_date` desc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PostFilter {
    pub(crate) category_id: Option<i64>,
    pub(crate) author_id: Option<i64>,
    pub(crate) visibility: PostVisibility,
}

impl PostFilter {
    pub(crate) fn index(now: DateTime<Utc>) -> Self {
        Self {
            category_id: None,
            author_id: None,
            visibility: PostVisibility::PublicAt(now),
        }
    }

    pub(crate) fn category(category_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            category_id: Some(category_id),
            author_id: None,
            visibility: PostVisibility::PublicAt(now),
        }
    }

    pub(crate) fn profile(author_id: i64, viewer: &Viewer, now: DateTime<Utc>) -> Self {
        let visibility = if viewer.is(author_id) {
            PostVisibility::Unrestricted
        } else {
            PostVisibility::PublicAt(now)
        };
        Self {
            category_id: None,
            author_id: Some(author_id),
            visibility,
        }
    }

    pub(crate) fn matches(&self, post: &Post) -> bool {
        if let Some(category_id) = self.category_id
            && post.category.as_ref().map(|category| category.id) != Some(category_id)
        {
            return false;
        }
        if let Some(author_id) = self.author_id
            && post.author_id != author_id
        {
            return false;
        }
        match self.visibility {
            PostVisibility::PublicAt(now) => is_publicly_visible(post, now),
            PostVisibility::Unrestricted => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pagination {
    pub(crate) page: u32,
    pub(crate) page_size: u32,
}

impl Pagination {
    pub(crate) fn new(page: u32, page_size: u32) -> Result<Self, DomainError> {
        if page == 0 {
            return Err(DomainError::Validation {
                field: "page",
                message: "must be >= 1",
            });
        }
        if page_size == 0 {
            return Err(DomainError::Validation {
                field: "page_size",
                message: "must be >= 1",
            });
        }
        Ok(Self { page, page_size })
    }

    pub(crate) fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * self.limit()
    }

    pub(crate) fn num_pages(&self, total: i64) -> u32 {
        let total = total.max(0) as u64;
        let pages = total.div_ceil(u64::from(self.page_size)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// An empty first page is fine; any other page past the end is not.
    pub(crate) fn ensure_in_range(&self, total: i64) -> Result<(), DomainError> {
        if self.page > self.num_pages(total) {
            return Err(DomainError::NotFound(format!("page {}", self.page)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Page<T> {
    pub(crate) items: Vec<T>,
    pub(crate) page: u32,
    pub(crate) page_size: u32,
    pub(crate) total: i64,
    pub(crate) num_pages: u32,
}

impl<T> Page<T> {
    pub(crate) fn new(items: Vec<T>, pagination: Pagination, total: i64) -> Self {
        Self {
            items,
            page: pagination.page,
            page_size: pagination.page_size,
            total,
            num_pages: pagination.num_pages(total),
        }
    }
}
