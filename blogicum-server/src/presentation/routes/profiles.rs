use axum::Router;
use axum::routing::{get, put};

use crate::presentation::AppState;
use crate::presentation::handlers::profiles::{get_profile, update_profile};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/profiles/{username}", get(get_profile))
        .route("/profile", put(update_profile))
}
