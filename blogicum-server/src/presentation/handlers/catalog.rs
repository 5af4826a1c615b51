use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use super::PageQuery;
use super::posts::PostPageDto;
use crate::domain::catalog::{Category, Location};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) slug: String,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            title: category.title,
            description: category.description,
            slug: category.slug,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LocationDto {
    pub(crate) id: i64,
    pub(crate) name: String,
}

impl From<Location> for LocationDto {
    fn from(location: Location) -> Self {
        Self {
            id: location.id,
            name: location.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryPostsDto {
    pub(crate) category: CategoryDto,
    pub(crate) posts: PostPageDto,
}

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "catalog",
    responses(
        (status = 200, description = "Published categories by title", body = [CategoryDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CategoryDto>>> {
    let categories = state.catalog_service.published_categories().await?;
    Ok(Json(categories.into_iter().map(CategoryDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/locations",
    tag = "catalog",
    responses(
        (status = 200, description = "Published locations by name", body = [LocationDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_locations(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<LocationDto>>> {
    let locations = state.catalog_service.published_locations().await?;
    Ok(Json(locations.into_iter().map(LocationDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/categories/{slug}/posts",
    tag = "catalog",
    params(
        ("slug" = String, Path, description = "Category slug"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Publicly visible posts of the category", body = CategoryPostsDto),
        (status = 400, description = "Invalid page number"),
        (status = 404, description = "Category missing or unpublished, or page past the end"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn category_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<CategoryPostsDto>> {
    let listing = state
        .blog_service
        .category_posts(&slug, query.page(), Utc::now())
        .await?;
    Ok(Json(CategoryPostsDto {
        category: listing.category.into(),
        posts: listing.posts.into(),
    }))
}
