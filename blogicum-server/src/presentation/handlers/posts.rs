use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderName, StatusCode, header},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::comments::CommentDto;
use super::{Located, PageQuery, Payload, located, post_location, profile_location};
use crate::application::blog_service::PostDetail;
use crate::domain::catalog::{CategoryRef, LocationRef};
use crate::domain::listing::Page;
use crate::domain::post::{CreatePostRequest, Post, PostSummary, UpdatePostRequest};
use crate::domain::viewer::Viewer;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PostPayloadDto {
    #[validate(length(min = 1, max = 256))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) text: String,
    #[validate(length(max = 255))]
    pub(crate) image: Option<String>,
    /// Defaults to the request time on create and to the stored value on edit.
    pub(crate) pub_date: Option<DateTime<Utc>>,
    pub(crate) is_published: Option<bool>,
    #[validate(range(min = 1))]
    pub(crate) category_id: Option<i64>,
    #[validate(range(min = 1))]
    pub(crate) location_id: Option<i64>,
}

impl From<PostPayloadDto> for CreatePostRequest {
    fn from(dto: PostPayloadDto) -> Self {
        Self {
            title: dto.title,
            text: dto.text,
            image: dto.image,
            pub_date: dto.pub_date,
            is_published: dto.is_published,
            category_id: dto.category_id,
            location_id: dto.location_id,
        }
    }
}

impl From<PostPayloadDto> for UpdatePostRequest {
    fn from(dto: PostPayloadDto) -> Self {
        Self {
            title: dto.title,
            text: dto.text,
            image: dto.image,
            pub_date: dto.pub_date,
            is_published: dto.is_published,
            category_id: dto.category_id,
            location_id: dto.location_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostCategoryDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
}

impl From<CategoryRef> for PostCategoryDto {
    fn from(category: CategoryRef) -> Self {
        Self {
            id: category.id,
            title: category.title,
            slug: category.slug,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostLocationDto {
    pub(crate) id: i64,
    pub(crate) name: String,
}

impl From<LocationRef> for PostLocationDto {
    fn from(location: LocationRef) -> Self {
        Self {
            id: location.id,
            name: location.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) image: Option<String>,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) is_published: bool,
    pub(crate) author_id: i64,
    pub(crate) author_username: String,
    pub(crate) category: Option<PostCategoryDto>,
    /// Omitted while the location is unpublished.
    pub(crate) location: Option<PostLocationDto>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            text: post.text,
            image: post.image,
            pub_date: post.pub_date,
            is_published: post.is_published,
            author_id: post.author_id,
            author_username: post.author_username,
            category: post.category.map(PostCategoryDto::from),
            location: post
                .location
                .filter(|location| location.is_published)
                .map(PostLocationDto::from),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostSummaryDto {
    #[serde(flatten)]
    pub(crate) post: PostDto,
    pub(crate) comment_count: i64,
}

impl From<PostSummary> for PostSummaryDto {
    fn from(summary: PostSummary) -> Self {
        Self {
            post: summary.post.into(),
            comment_count: summary.comment_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostPageDto {
    pub(crate) posts: Vec<PostSummaryDto>,
    pub(crate) page: u32,
    pub(crate) page_size: u32,
    pub(crate) total: i64,
    pub(crate) num_pages: u32,
}

impl From<Page<PostSummary>> for PostPageDto {
    fn from(page: Page<PostSummary>) -> Self {
        Self {
            posts: page.items.into_iter().map(PostSummaryDto::from).collect(),
            page: page.page,
            page_size: page.page_size,
            total: page.total,
            num_pages: page.num_pages,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailDto {
    #[serde(flatten)]
    pub(crate) post: PostDto,
    pub(crate) comment_count: i64,
    pub(crate) comments: Vec<CommentDto>,
}

impl From<PostDetail> for PostDetailDto {
    fn from(detail: PostDetail) -> Self {
        Self {
            post: detail.post.into(),
            comment_count: detail.comments.len() as i64,
            comments: detail.comments.into_iter().map(CommentDto::from).collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(PageQuery),
    responses(
        (status = 200, description = "Publicly visible posts", body = PostPageDto),
        (status = 400, description = "Invalid page number"),
        (status = 404, description = "Page past the end"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PostPageDto>> {
    let page = state.blog_service.index(query.page(), Utc::now()).await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post with its comments", body = PostDetailDto),
        (status = 401, description = "Invalid bearer token"),
        (status = 404, description = "Post not found or hidden"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> AppResult<Json<PostDetailDto>> {
    let detail = state.blog_service.get_post(id, &viewer, Utc::now()).await?;
    Ok(Json(detail.into()))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = PostPayloadDto,
    responses(
        (status = 201, description = "Post created, Location names the author profile", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    viewer: Viewer,
    payload: Payload<PostPayloadDto>,
) -> AppResult<Located<PostDto>> {
    viewer.require_authenticated()?;
    let dto = payload.into_inner()?;
    dto.validate()?;

    let post = state
        .blog_service
        .create_post(&viewer, dto.into(), Utc::now())
        .await?;
    Ok(located(
        StatusCode::CREATED,
        profile_location(&post.author_username),
        post.into(),
    ))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = PostPayloadDto,
    responses(
        (status = 200, description = "Post updated, Location names the post", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
    payload: Payload<PostPayloadDto>,
) -> AppResult<Located<PostDto>> {
    let target = state.blog_service.editable_post(&viewer, id).await?;
    let dto = payload.into_inner()?;
    dto.validate()?;

    let post = state.blog_service.update_post(target, dto.into()).await?;
    Ok(located(StatusCode::OK, post_location(post.id), post.into()))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post and its comments deleted, Location names the author profile"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1])> {
    let post = state.blog_service.delete_post(&viewer, id).await?;
    Ok((
        StatusCode::NO_CONTENT,
        [(header::LOCATION, profile_location(&post.author_username))],
    ))
}
