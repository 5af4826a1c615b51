use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{Located, Payload, located, profile_location};
use crate::application::auth_service::Session;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct RegisterDto {
    #[validate(length(min = 3, max = 64))]
    pub(crate) username: String,
    #[validate(email)]
    pub(crate) email: String,
    #[validate(length(min = 8, max = 128))]
    pub(crate) password: String,
    #[validate(length(max = 150))]
    pub(crate) first_name: Option<String>,
    #[validate(length(max = 150))]
    pub(crate) last_name: Option<String>,
}

impl From<RegisterDto> for RegisterRequest {
    fn from(dto: RegisterDto) -> Self {
        Self {
            username: dto.username,
            email: dto.email,
            password: dto.password,
            first_name: dto.first_name,
            last_name: dto.last_name,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct LoginDto {
    /// Username or email.
    #[serde(alias = "username")]
    #[validate(length(min = 1, max = 254))]
    pub(crate) login: String,
    #[validate(length(min = 1))]
    pub(crate) password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct SessionDto {
    pub(crate) access_token: String,
    pub(crate) token_type: &'static str,
    /// Token lifetime in seconds.
    pub(crate) expires_in: i64,
    pub(crate) user: UserDto,
}

impl From<Session> for SessionDto {
    fn from(session: Session) -> Self {
        Self {
            access_token: session.access_token,
            token_type: "Bearer",
            expires_in: session.expires_in,
            user: session.user.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterDto,
    responses(
        (status = 201, description = "Account and profile created, Location names the profile", body = SessionDto),
        (status = 400, description = "Validation error or malformed body"),
        (status = 409, description = "Username or email taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    payload: Payload<RegisterDto>,
) -> AppResult<Located<SessionDto>> {
    let dto = payload.into_inner()?;
    dto.validate()?;

    let session = state.auth_service.register(dto.into()).await?;
    let location = profile_location(&session.user.username);
    Ok(located(StatusCode::CREATED, location, session.into()))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Signed in", body = SessionDto),
        (status = 400, description = "Validation error or malformed body"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    payload: Payload<LoginDto>,
) -> AppResult<Json<SessionDto>> {
    let dto = payload.into_inner()?;
    dto.validate()?;

    let session = state
        .auth_service
        .login(LoginRequest {
            login: dto.login,
            password: dto.password,
        })
        .await?;
    Ok(Json(session.into()))
}
