use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::domain::viewer::Viewer;
use crate::presentation::AppState;
use crate::presentation::app_error::AppError;

/// Resolves the [`Viewer`] of every request. A missing `Authorization` header
/// means anonymous, a present but unusable one is rejected.
pub(crate) async fn viewer_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let viewer = match request.headers().get(header::AUTHORIZATION) {
        None => Viewer::Anonymous,
        Some(value) => {
            let token = bearer_token(value)?;
            let claims = state.jwt.verify_token(token).map_err(|err| {
                debug!(error = %err, "bearer token rejected");
                AppError::InvalidToken
            })?;
            claims.viewer()
        }
    };

    request.extensions_mut().insert(viewer);
    Ok(next.run(request).await)
}

fn bearer_token(value: &HeaderValue) -> Result<&str, AppError> {
    let raw = value.to_str().map_err(|_| AppError::InvalidToken)?;

    let mut parts = raw.split_whitespace();
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AppError::InvalidToken);
    };
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::InvalidToken);
    }
    Ok(token)
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Viewer>().copied().unwrap_or_default())
    }
}
