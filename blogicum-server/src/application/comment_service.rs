use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::{BlogSettings, Owned};
use super::blog_service::load_visible_post;
use crate::data::Repositories;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::PostRepository;
use crate::domain::comment::{Comment, CommentRequest};
use crate::domain::error::DomainError;
use crate::domain::guard::ensure_can_mutate;
use crate::domain::viewer::Viewer;

pub(crate) struct CommentService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    require_published_post: bool,
}

impl CommentService {
    pub(crate) fn new(repos: &Repositories, settings: BlogSettings) -> Self {
        Self {
            posts: repos.posts.clone(),
            comments: repos.comments.clone(),
            require_published_post: settings.comments_require_published_post,
        }
    }

    pub(crate) async fn list_comments(
        &self,
        post_id: i64,
        viewer: &Viewer,
        now: DateTime<Utc>,
    ) -> Result<Vec<Comment>, DomainError> {
        let post = load_visible_post(self.posts.as_ref(), post_id, viewer, now).await?;
        self.comments.list_comments(post.id).await
    }

    pub(crate) async fn add_comment(
        &self,
        viewer: &Viewer,
        post_id: i64,
        req: CommentRequest,
        now: DateTime<Utc>,
    ) -> Result<Comment, DomainError> {
        let author_id = viewer.require_authenticated()?;
        let post = load_visible_post(self.posts.as_ref(), post_id, viewer, now).await?;
        if self.require_published_post && !post.is_published {
            return Err(DomainError::post_not_found(post_id));
        }
        let req = req.validate()?;

        let comment = self
            .comments
            .create_comment(NewComment {
                post_id: post.id,
                author_id,
                text: req.text,
            })
            .await?;
        info!(comment_id = comment.id, post_id, author_id, "comment added");
        Ok(comment)
    }

    /// Authentication, lookup within the post and ownership, in that order.
    pub(crate) async fn editable_comment(
        &self,
        viewer: &Viewer,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Owned<Comment>, DomainError> {
        viewer.require_authenticated()?;
        let comment = self.load_comment(post_id, comment_id).await?;
        let owner_id = ensure_can_mutate(comment.author_id, viewer)?;
        Ok(Owned::new(comment, owner_id))
    }

    pub(crate) async fn update_comment(
        &self,
        target: Owned<Comment>,
        req: CommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;
        let comment_id = target.get().id;

        let comment = self
            .comments
            .update_comment(comment_id, req.text)
            .await?
            .ok_or_else(|| DomainError::comment_not_found(comment_id))?;
        info!(comment_id, post_id = comment.post_id, "comment updated");
        Ok(comment)
    }

    pub(crate) async fn delete_comment(
        &self,
        viewer: &Viewer,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Comment, DomainError> {
        let target = self.editable_comment(viewer, post_id, comment_id).await?;

        if !self.comments.delete_comment(comment_id).await? {
            return Err(DomainError::comment_not_found(comment_id));
        }
        info!(comment_id, post_id, "comment deleted");
        Ok(target.into_inner())
    }

    async fn load_comment(&self, post_id: i64, comment_id: i64) -> Result<Comment, DomainError> {
        self.comments
            .get_comment(post_id, comment_id)
            .await?
            .ok_or_else(|| DomainError::comment_not_found(comment_id))
    }
}
