use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{BlogSettings, Owned};
use crate::data::Repositories;
use crate::data::catalog_repository::CatalogRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::domain::catalog::Category;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::guard::ensure_can_mutate;
use crate::domain::listing::{Page, Pagination, PostFilter};
use crate::domain::post::{CreatePostRequest, Post, PostSummary, UpdatePostRequest};
use crate::domain::user::User;
use crate::domain::viewer::Viewer;
use crate::domain::visibility::is_visible_to;

#[derive(Debug, Clone)]
pub(crate) struct PostDetail {
    pub(crate) post: Post,
    pub(crate) comments: Vec<Comment>,
}

#[derive(Debug, Clone)]
pub(crate) struct CategoryPosts {
    pub(crate) category: Category,
    pub(crate) posts: Page<PostSummary>,
}

#[derive(Debug, Clone)]
pub(crate) struct ProfilePosts {
    pub(crate) profile: User,
    pub(crate) is_owner: bool,
    pub(crate) posts: Page<PostSummary>,
}

/// Loads a post the viewer may see. Missing and hidden posts are reported
/// the same way.
pub(crate) async fn load_visible_post(
    posts: &dyn PostRepository,
    post_id: i64,
    viewer: &Viewer,
    now: DateTime<Utc>,
) -> Result<Post, DomainError> {
    match posts.get_post(post_id).await? {
        Some(post) if is_visible_to(&post, viewer, now) => Ok(post),
        _ => Err(DomainError::post_not_found(post_id)),
    }
}

pub(crate) struct BlogService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    catalog: Arc<dyn CatalogRepository>,
    users: Arc<dyn UserRepository>,
    posts_per_page: u32,
}

impl BlogService {
    pub(crate) fn new(repos: &Repositories, settings: BlogSettings) -> Self {
        Self {
            posts: repos.posts.clone(),
            comments: repos.comments.clone(),
            catalog: repos.catalog.clone(),
            users: repos.users.clone(),
            posts_per_page: settings.posts_per_page,
        }
    }

    pub(crate) async fn index(
        &self,
        page: u32,
        now: DateTime<Utc>,
    ) -> Result<Page<PostSummary>, DomainError> {
        self.list_page(PostFilter::index(now), page).await
    }

    pub(crate) async fn category_posts(
        &self,
        slug: &str,
        page: u32,
        now: DateTime<Utc>,
    ) -> Result<CategoryPosts, DomainError> {
        let category = self
            .catalog
            .get_category_by_slug(slug)
            .await?
            .filter(|category| category.is_published)
            .ok_or_else(|| DomainError::NotFound(format!("category: {slug}")))?;

        let posts = self
            .list_page(PostFilter::category(category.id, now), page)
            .await?;
        Ok(CategoryPosts { category, posts })
    }

    pub(crate) async fn profile_posts(
        &self,
        username: &str,
        viewer: &Viewer,
        page: u32,
        now: DateTime<Utc>,
    ) -> Result<ProfilePosts, DomainError> {
        let profile = self
            .users
            .get_profile(username)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user: {username}")))?;

        let is_owner = viewer.is(profile.id);
        let posts = self
            .list_page(PostFilter::profile(profile.id, viewer, now), page)
            .await?;
        Ok(ProfilePosts {
            profile,
            is_owner,
            posts,
        })
    }

    pub(crate) async fn get_post(
        &self,
        post_id: i64,
        viewer: &Viewer,
        now: DateTime<Utc>,
    ) -> Result<PostDetail, DomainError> {
        let post = load_visible_post(self.posts.as_ref(), post_id, viewer, now).await?;
        let comments = self.comments.list_comments(post.id).await?;
        Ok(PostDetail { post, comments })
    }

    pub(crate) async fn create_post(
        &self,
        viewer: &Viewer,
        req: CreatePostRequest,
        now: DateTime<Utc>,
    ) -> Result<Post, DomainError> {
        let author_id = viewer.require_authenticated()?;
        let req = req.validate()?;
        self.ensure_catalog_refs(req.category_id, req.location_id)
            .await?;

        let new_post = NewPost {
            title: req.title,
            text: req.text,
            image: req.image,
            pub_date: req.pub_date.unwrap_or(now),
            is_published: req.is_published.unwrap_or(true),
            author_id,
            category_id: req.category_id,
            location_id: req.location_id,
        };
        let post = self.posts.create_post(new_post).await?;
        info!(post_id = post.id, author_id, "post created");
        Ok(post)
    }

    /// Authentication, lookup and ownership, in that order.
    pub(crate) async fn editable_post(
        &self,
        viewer: &Viewer,
        post_id: i64,
    ) -> Result<Owned<Post>, DomainError> {
        viewer.require_authenticated()?;
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))?;
        let owner_id = self.guard(post.author_id, viewer, post_id)?;
        Ok(Owned::new(post, owner_id))
    }

    pub(crate) async fn update_post(
        &self,
        target: Owned<Post>,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        self.ensure_catalog_refs(req.category_id, req.location_id)
            .await?;

        let current = target.get();
        let post_id = current.id;
        let author_id = target.owner_id();
        let patch = PostPatch {
            title: req.title,
            text: req.text,
            image: req.image,
            pub_date: req.pub_date.unwrap_or(current.pub_date),
            is_published: req.is_published.unwrap_or(current.is_published),
            category_id: req.category_id,
            location_id: req.location_id,
        };
        let post = self
            .posts
            .update_post_owned(post_id, author_id, patch)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))?;
        info!(post_id, author_id, "post updated");
        Ok(post)
    }

    pub(crate) async fn delete_post(
        &self,
        viewer: &Viewer,
        post_id: i64,
    ) -> Result<Post, DomainError> {
        let target = self.editable_post(viewer, post_id).await?;

        if !self.posts.delete_post(post_id).await? {
            return Err(DomainError::post_not_found(post_id));
        }
        info!(post_id, author_id = target.owner_id(), "post deleted");
        Ok(target.into_inner())
    }

    async fn list_page(
        &self,
        filter: PostFilter,
        page: u32,
    ) -> Result<Page<PostSummary>, DomainError> {
        let pagination = Pagination::new(page, self.posts_per_page)?;
        let total = self.posts.count_posts(filter).await?;
        pagination.ensure_in_range(total)?;

        let posts = self.posts.list_posts(filter, pagination).await?;
        Ok(Page::new(posts, pagination, total))
    }

    fn guard(&self, owner_id: i64, viewer: &Viewer, post_id: i64) -> Result<i64, DomainError> {
        ensure_can_mutate(owner_id, viewer).inspect_err(|_| {
            debug!(post_id, viewer = ?viewer, "post mutation denied");
        })
    }

    async fn ensure_catalog_refs(
        &self,
        category_id: Option<i64>,
        location_id: Option<i64>,
    ) -> Result<(), DomainError> {
        if let Some(id) = category_id
            && self.catalog.get_category(id).await?.is_none()
        {
            return Err(DomainError::Validation {
                field: "category_id",
                message: "unknown category",
            });
        }
        if let Some(id) = location_id
            && self.catalog.get_location(id).await?.is_none()
        {
            return Err(DomainError::Validation {
                field: "location_id",
                message: "unknown location",
            });
        }
        Ok(())
    }
}
