use axum::{Json, Router, middleware, routing::get};
use serde::Serialize;

use super::AppState;
use super::middleware::auth::viewer_middleware;

pub(crate) mod auth;
pub(crate) mod catalog;
pub(crate) mod posts;
pub(crate) mod profiles;

pub(crate) fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth::router())
        .nest("/posts", posts::router())
        .merge(catalog::router())
        .merge(profiles::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            viewer_middleware,
        ));

    Router::new()
        .route("/healthz", get(health_handler))
        .nest("/api", api)
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthzResponse {
    status: &'static str,
}

async fn health_handler() -> Json<HealthzResponse> {
    Json(HealthzResponse { status: "ok" })
}
