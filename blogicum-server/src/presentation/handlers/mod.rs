use std::convert::Infallible;

use axum::Json;
use axum::extract::{FromRequest, Request, rejection::JsonRejection};
use axum::http::{HeaderName, StatusCode, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use utoipa::{IntoParams, ToSchema};

use crate::presentation::app_error::AppResult;

pub(crate) mod auth;
pub(crate) mod catalog;
pub(crate) mod comments;
pub(crate) mod posts;
pub(crate) mod profiles;

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct PageQuery {
    pub(crate) page: Option<u32>,
}

impl PageQuery {
    pub(crate) fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }
}

/// JSON body whose rejection is held until the handler asks for it, so the
/// caller is authenticated and authorized before the body is judged.
pub(crate) struct Payload<T>(Result<T, JsonRejection>);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Json::<T>::from_request(req, state).await;
        Ok(Self(body.map(|Json(value)| value)))
    }
}

impl<T> Payload<T> {
    pub(crate) fn into_inner(self) -> AppResult<T> {
        Ok(self.0?)
    }
}

pub(crate) type Located<T> = (StatusCode, [(HeaderName, String); 1], Json<T>);

pub(crate) fn located<T>(status: StatusCode, location: String, body: T) -> Located<T> {
    (status, [(header::LOCATION, location)], Json(body))
}

pub(crate) fn post_location(post_id: i64) -> String {
    format!("/api/posts/{post_id}")
}

pub(crate) fn profile_location(username: &str) -> String {
    format!("/api/profiles/{username}")
}
