use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::domain::error::DomainError;

pub(crate) const LOGIN_URL: &str = "/api/auth/login";

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("malformed body: {}", .0.body_text())]
    Body(#[from] JsonRejection),

    /// Bearer token present but unusable.
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    login_url: Option<&'static str>,
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Domain(err) => match err {
                DomainError::Validation { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
                DomainError::AlreadyExists(_) => (StatusCode::CONFLICT, err.to_string()),
                DomainError::InvalidCredentials | DomainError::AuthenticationRequired => {
                    (StatusCode::UNAUTHORIZED, err.to_string())
                }
                DomainError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                DomainError::PermissionDenied => (StatusCode::FORBIDDEN, err.to_string()),
                DomainError::Unexpected(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                ),
            },
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Body(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = self.status_and_message();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }

        let login_required = matches!(self, AppError::Domain(DomainError::AuthenticationRequired));
        let body = ErrorBody {
            error: msg,
            login_url: login_required.then_some(LOGIN_URL),
        };
        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer"),
            );
        }
        if login_required {
            response
                .headers_mut()
                .insert(header::LOCATION, HeaderValue::from_static(LOGIN_URL));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;

    use super::{AppError, LOGIN_URL};
    use crate::domain::error::DomainError;

    #[test]
    fn authentication_required_points_to_login() {
        let response = AppError::from(DomainError::AuthenticationRequired).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some(LOGIN_URL)
        );
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::PermissionDenied, StatusCode::FORBIDDEN),
            (DomainError::post_not_found(1), StatusCode::NOT_FOUND),
            (
                DomainError::AlreadyExists("username".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                DomainError::Validation {
                    field: "title",
                    message: "must not be empty",
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::Unexpected("db down".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status);
            assert!(!response.headers().contains_key(header::LOCATION));
        }
    }
}
