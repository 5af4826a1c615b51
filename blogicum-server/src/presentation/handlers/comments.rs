use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderName, StatusCode, header},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{Located, Payload, located, post_location};
use crate::domain::comment::{Comment, CommentRequest};
use crate::domain::viewer::Viewer;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CommentPayloadDto {
    #[validate(length(min = 1))]
    pub(crate) text: String,
}

impl From<CommentPayloadDto> for CommentRequest {
    fn from(dto: CommentPayloadDto) -> Self {
        Self { text: dto.text }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) author_username: String,
    pub(crate) text: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author_username: comment.author_username,
            text: comment.text,
            created_at: comment.created_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}/comments",
    tag = "comments",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Comments, oldest first", body = [CommentDto]),
        (status = 404, description = "Post not found or hidden"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_comments(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(post_id): Path<i64>,
) -> AppResult<Json<Vec<CommentDto>>> {
    let comments = state
        .comment_service
        .list_comments(post_id, &viewer, Utc::now())
        .await?;
    Ok(Json(comments.into_iter().map(CommentDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/comments",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = CommentPayloadDto,
    responses(
        (status = 201, description = "Comment added, Location names the post", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Post not found or closed for comments"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(post_id): Path<i64>,
    payload: Payload<CommentPayloadDto>,
) -> AppResult<Located<CommentDto>> {
    viewer.require_authenticated()?;
    let dto = payload.into_inner()?;
    dto.validate()?;

    let comment = state
        .comment_service
        .add_comment(&viewer, post_id, dto.into(), Utc::now())
        .await?;
    Ok(located(
        StatusCode::CREATED,
        post_location(comment.post_id),
        comment.into(),
    ))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}/comments/{comment_id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    request_body = CommentPayloadDto,
    responses(
        (status = 200, description = "Comment updated, Location names the post", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_comment(
    State(state): State<AppState>,
    viewer: Viewer,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    payload: Payload<CommentPayloadDto>,
) -> AppResult<Located<CommentDto>> {
    let target = state
        .comment_service
        .editable_comment(&viewer, post_id, comment_id)
        .await?;
    let dto = payload.into_inner()?;
    dto.validate()?;

    let comment = state
        .comment_service
        .update_comment(target, dto.into())
        .await?;
    Ok(located(
        StatusCode::OK,
        post_location(comment.post_id),
        comment.into(),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}/comments/{comment_id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 204, description = "Comment deleted, Location names the post"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    viewer: Viewer,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1])> {
    let comment = state
        .comment_service
        .delete_comment(&viewer, post_id, comment_id)
        .await?;
    Ok((
        StatusCode::NO_CONTENT,
        [(header::LOCATION, post_location(comment.post_id))],
    ))
}
