use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::handlers::catalog::{category_posts, list_categories, list_locations};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/{slug}/posts", get(category_posts))
        .route("/locations", get(list_locations))
}
