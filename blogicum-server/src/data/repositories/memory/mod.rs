//! In-process store with the same relational rules as the PostgreSQL schema:
//! foreign keys are checked on write, deleting a post removes its comments and
//! dangling category/location references read back as `None`.
//!
//! Data is lost on process restart.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::catalog::{Category, Location};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::User;

mod catalog_repository;
mod comment_repository;
mod post_repository;
mod user_repository;

#[derive(Debug, Clone)]
struct UserRecord {
    user: User,
    password_hash: String,
}

#[derive(Debug, Clone)]
struct PostRecord {
    id: i64,
    title: String,
    text: String,
    image: Option<String>,
    pub_date: DateTime<Utc>,
    is_published: bool,
    author_id: i64,
    category_id: Option<i64>,
    location_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CommentRecord {
    id: i64,
    post_id: i64,
    author_id: i64,
    text: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, UserRecord>,
    categories: BTreeMap<i64, Category>,
    locations: BTreeMap<i64, Location>,
    posts: BTreeMap<i64, PostRecord>,
    comments: BTreeMap<i64, CommentRecord>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn username(&self, user_id: i64) -> Result<String, DomainError> {
        self.users
            .get(&user_id)
            .map(|record| record.user.username.clone())
            .ok_or_else(|| DomainError::Unexpected(format!("dangling user id: {user_id}")))
    }

    fn ensure_references(
        &self,
        author_id: i64,
        category_id: Option<i64>,
        location_id: Option<i64>,
    ) -> Result<(), DomainError> {
        if !self.users.contains_key(&author_id) {
            return Err(DomainError::NotFound("author".to_string()));
        }
        if let Some(id) = category_id
            && !self.categories.contains_key(&id)
        {
            return Err(DomainError::NotFound("category".to_string()));
        }
        if let Some(id) = location_id
            && !self.locations.contains_key(&id)
        {
            return Err(DomainError::NotFound("location".to_string()));
        }
        Ok(())
    }

    fn hydrate_post(&self, record: &PostRecord) -> Result<Post, DomainError> {
        Post {
            id: record.id,
            title: record.title.clone(),
            text: record.text.clone(),
            image: record.image.clone(),
            pub_date: record.pub_date,
            is_published: record.is_published,
            author_id: record.author_id,
            author_username: self.username(record.author_id)?,
            category: record
                .category_id
                .and_then(|id| self.categories.get(&id))
                .map(Category::to_ref),
            location: record
                .location_id
                .and_then(|id| self.locations.get(&id))
                .map(Location::to_ref),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
        .ensure_consistent()
        .map_err(|err| DomainError::Unexpected(err.to_string()))
    }

    fn hydrate_comment(&self, record: &CommentRecord) -> Result<Comment, DomainError> {
        Ok(Comment {
            id: record.id,
            post_id: record.post_id,
            author_id: record.author_id,
            author_username: self.username(record.author_id)?,
            text: record.text.clone(),
            created_at: record.created_at,
        })
    }

    fn comment_count(&self, post_id: i64) -> i64 {
        self.comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .count() as i64
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}
