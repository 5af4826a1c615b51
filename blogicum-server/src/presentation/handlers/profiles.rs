use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::auth::UserDto;
use super::posts::PostPageDto;
use super::{Located, PageQuery, Payload, located, profile_location};
use crate::domain::user::{UpdateProfileRequest, User};
use crate::domain::viewer::Viewer;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProfileDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<User> for ProfileDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProfilePageDto {
    pub(crate) profile: ProfileDto,
    /// The viewer owns this profile; drafts and scheduled posts are included.
    pub(crate) is_owner: bool,
    pub(crate) posts: PostPageDto,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateProfileDto {
    #[validate(length(min = 3, max = 64))]
    pub(crate) username: String,
    #[validate(email)]
    pub(crate) email: String,
    #[validate(length(max = 150))]
    pub(crate) first_name: Option<String>,
    #[validate(length(max = 150))]
    pub(crate) last_name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/profiles/{username}",
    tag = "profiles",
    params(
        ("username" = String, Path, description = "Username"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Profile and its posts", body = ProfilePageDto),
        (status = 400, description = "Invalid page number"),
        (status = 404, description = "User not found or page past the end"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_profile(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ProfilePageDto>> {
    let listing = state
        .blog_service
        .profile_posts(&username, &viewer, query.page(), Utc::now())
        .await?;
    Ok(Json(ProfilePageDto {
        profile: listing.profile.into(),
        is_owner: listing.is_owner,
        posts: listing.posts.into(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "profiles",
    security(
        ("bearer_auth" = [])
    ),
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated, Location names the profile", body = UserDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 409, description = "Username or email taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_profile(
    State(state): State<AppState>,
    viewer: Viewer,
    payload: Payload<UpdateProfileDto>,
) -> AppResult<Located<UserDto>> {
    viewer.require_authenticated()?;
    let dto = payload.into_inner()?;
    dto.validate()?;

    let req = UpdateProfileRequest {
        username: dto.username,
        email: dto.email,
        first_name: dto.first_name,
        last_name: dto.last_name,
    };
    let user = state.profile_service.update_profile(&viewer, req).await?;
    Ok(located(
        StatusCode::OK,
        profile_location(&user.username),
        user.into(),
    ))
}
