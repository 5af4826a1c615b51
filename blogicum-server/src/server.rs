use std::time::Duration;

use anyhow::Context;
use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::{BoxError, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::infrastructure::settings::Settings;
use crate::presentation::middleware::cors::apply_cors;
use crate::presentation::middleware::trace::apply_trace;
use crate::presentation::openapi::ApiDoc;
use crate::presentation::{AppState, routes};

pub(crate) async fn run_http(settings: &Settings, state: AppState) -> anyhow::Result<()> {
    let app = build_app(settings, state)?;

    let listener = TcpListener::bind(&settings.http_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.http_addr))?;

    info!("HTTP server listening on {}", settings.http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub(crate) fn build_app(settings: &Settings, state: AppState) -> anyhow::Result<Router> {
    let app = build_router(state);
    let app = apply_limits(app, settings);
    let app = apply_trace(app);
    apply_cors(app, settings)
}

pub(crate) fn build_router(state: AppState) -> Router {
    routes::router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

fn apply_limits(router: Router, settings: &Settings) -> Router {
    router
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(Duration::from_secs(settings.http_request_timeout_secs))
                .concurrency_limit(settings.http_concurrency_limit),
        )
        .layer(RequestBodyLimitLayer::new(
            settings.http_request_body_limit_bytes,
        ))
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<serde_json::Value>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        warn!("request timed out");
        return (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "request timed out" })),
        );
    }

    warn!(error = %err, "request rejected by middleware");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal error" })),
    )
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{HeaderMap, Method, Request, StatusCode, header};
    use chrono::{Duration, Utc};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::build_router;
    use crate::application::BlogSettings;
    use crate::application::catalog_service::CatalogImport;
    use crate::data::Repositories;
    use crate::infrastructure::jwt::JwtService;
    use crate::presentation::AppState;

    struct TestApp {
        router: Router,
        state: AppState,
        repos: Repositories,
    }

    struct TestResponse {
        status: StatusCode,
        headers: HeaderMap,
        body: Value,
    }

    impl TestResponse {
        fn location(&self) -> Option<&str> {
            self.headers
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok())
        }
    }

    impl TestApp {
        fn new() -> Self {
            let repos = Repositories::in_memory();
            let jwt = Arc::new(JwtService::new("0123456789abcdef0123456789abcdef", 3600));
            let state = AppState::new(
                &repos,
                BlogSettings {
                    posts_per_page: 2,
                    ..BlogSettings::default()
                },
                jwt,
            );
            Self {
                router: build_router(state.clone()),
                state,
                repos,
            }
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> TestResponse {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string())),
                None => builder.body(Body::empty()),
            }
            .expect("request must build");

            let response = self
                .router
                .clone()
                .oneshot(request)
                .await
                .expect("router is infallible");
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("body must be readable");
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            TestResponse {
                status,
                headers,
                body,
            }
        }

        async fn register(&self, username: &str) -> String {
            let response = self
                .send(
                    Method::POST,
                    "/api/auth/register",
                    None,
                    Some(json!({
                        "username": username,
                        "email": format!("{username}@example.com"),
                        "password": "very-secure-password",
                    })),
                )
                .await;
            assert_eq!(response.status, StatusCode::CREATED);
            response.body["access_token"]
                .as_str()
                .expect("token must be returned")
                .to_string()
        }

        async fn create_post(&self, token: &str, body: Value) -> i64 {
            let response = self
                .send(Method::POST, "/api/posts", Some(token), Some(body))
                .await;
            assert_eq!(response.status, StatusCode::CREATED);
            response.body["id"].as_i64().expect("post id")
        }
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let app = TestApp::new();
        let response = app.send(Method::GET, "/healthz", None, None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["status"], "ok");
    }

    #[tokio::test]
    async fn anonymous_create_is_redirected_to_login() {
        let app = TestApp::new();
        let response = app
            .send(
                Method::POST,
                "/api/posts",
                None,
                Some(json!({ "title": "t", "text": "x" })),
            )
            .await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.location(), Some("/api/auth/login"));
        assert_eq!(response.body["login_url"], "/api/auth/login");
    }

    #[tokio::test]
    async fn invalid_token_is_rejected_even_on_public_routes() {
        let app = TestApp::new();
        let response = app
            .send(Method::GET, "/api/posts", Some("not-a-jwt"), None)
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert!(response.location().is_none());
    }

    #[tokio::test]
    async fn scheduled_post_is_visible_only_to_its_author() {
        let app = TestApp::new();
        let author = app.register("author").await;
        let reader = app.register("reader").await;
        let tomorrow = Utc::now() + Duration::days(1);
        let id = app
            .create_post(
                &author,
                json!({ "title": "later", "text": "soon", "pub_date": tomorrow }),
            )
            .await;
        let uri = format!("/api/posts/{id}");

        let anonymous = app.send(Method::GET, &uri, None, None).await;
        assert_eq!(anonymous.status, StatusCode::NOT_FOUND);
        let stranger = app.send(Method::GET, &uri, Some(&reader), None).await;
        assert_eq!(stranger.status, StatusCode::NOT_FOUND);
        let missing = app
            .send(Method::GET, &format!("/api/posts/{}", id + 1000), None, None)
            .await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let owner = app.send(Method::GET, &uri, Some(&author), None).await;
        assert_eq!(owner.status, StatusCode::OK);
        assert_eq!(owner.body["title"], "later");

        let index = app.send(Method::GET, "/api/posts", None, None).await;
        assert_eq!(index.status, StatusCode::OK);
        assert_eq!(index.body["total"], 0);

        let profile = app
            .send(Method::GET, "/api/profiles/author", Some(&author), None)
            .await;
        assert_eq!(profile.body["is_owner"], true);
        assert_eq!(profile.body["posts"]["total"], 1);
    }

    #[tokio::test]
    async fn mutations_enforce_ownership_and_set_location() {
        let app = TestApp::new();
        let author = app.register("author").await;
        let reader = app.register("reader").await;

        let created = app
            .send(
                Method::POST,
                "/api/posts",
                Some(&author),
                Some(json!({ "title": "mine", "text": "body" })),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED);
        assert_eq!(created.location(), Some("/api/profiles/author"));
        let id = created.body["id"].as_i64().expect("post id");
        let uri = format!("/api/posts/{id}");
        let payload = json!({ "title": "edited", "text": "body" });

        let denied = app
            .send(Method::PUT, &uri, Some(&reader), Some(payload.clone()))
            .await;
        assert_eq!(denied.status, StatusCode::FORBIDDEN);
        assert_eq!(denied.body["error"], "you are not the author of this object");

        let edited = app
            .send(Method::PUT, &uri, Some(&author), Some(payload))
            .await;
        assert_eq!(edited.status, StatusCode::OK);
        assert_eq!(edited.location(), Some(uri.as_str()));
        assert_eq!(edited.body["title"], "edited");

        let comment = app
            .send(
                Method::POST,
                &format!("{uri}/comments"),
                Some(&reader),
                Some(json!({ "text": "nice" })),
            )
            .await;
        assert_eq!(comment.status, StatusCode::CREATED);
        assert_eq!(comment.location(), Some(uri.as_str()));

        let listing = app.send(Method::GET, "/api/posts", None, None).await;
        assert_eq!(listing.body["posts"][0]["comment_count"], 1);

        let deleted = app.send(Method::DELETE, &uri, Some(&author), None).await;
        assert_eq!(deleted.status, StatusCode::NO_CONTENT);
        assert_eq!(deleted.location(), Some("/api/profiles/author"));

        let gone = app
            .send(Method::GET, &format!("{uri}/comments"), None, None)
            .await;
        assert_eq!(gone.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn pagination_rejects_zero_and_pages_past_the_end() {
        let app = TestApp::new();
        let empty = app.send(Method::GET, "/api/posts?page=1", None, None).await;
        assert_eq!(empty.status, StatusCode::OK);
        assert_eq!(empty.body["posts"], json!([]));

        let zero = app.send(Method::GET, "/api/posts?page=0", None, None).await;
        assert_eq!(zero.status, StatusCode::BAD_REQUEST);

        let author = app.register("author").await;
        for title in ["a", "b", "c"] {
            app.create_post(&author, json!({ "title": title, "text": "x" }))
                .await;
        }
        let second = app.send(Method::GET, "/api/posts?page=2", None, None).await;
        assert_eq!(second.status, StatusCode::OK);
        assert_eq!(second.body["num_pages"], 2);
        let third = app.send(Method::GET, "/api/posts?page=3", None, None).await;
        assert_eq!(third.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn catalog_routes_hide_unpublished_entries() {
        let app = TestApp::new();
        let import: CatalogImport = serde_json::from_value(json!({
            "categories": [
                { "title": "Travel", "description": "Trips", "slug": "travel" },
                { "title": "Hidden", "description": "Drafts", "slug": "hidden", "is_published": false }
            ],
            "locations": [
                { "name": "Moscow" },
                { "name": "Secret", "is_published": false }
            ]
        }))
        .expect("fixture must parse");
        app.state
            .catalog_service
            .import(import)
            .await
            .expect("import must succeed");

        let categories = app.send(Method::GET, "/api/categories", None, None).await;
        assert_eq!(categories.body.as_array().map(Vec::len), Some(1));
        let hidden = app
            .send(Method::GET, "/api/categories/hidden/posts", None, None)
            .await;
        assert_eq!(hidden.status, StatusCode::NOT_FOUND);

        let locations = app.send(Method::GET, "/api/locations", None, None).await;
        assert_eq!(locations.body.as_array().map(Vec::len), Some(1));
        assert_eq!(locations.body[0]["name"], "Moscow");

        let secret = app
            .repos
            .catalog
            .list_locations(false)
            .await
            .expect("locations must load")
            .into_iter()
            .find(|location| location.name == "Secret")
            .expect("secret location must exist");
        let author = app.register("author").await;
        let id = app
            .create_post(
                &author,
                json!({ "title": "t", "text": "x", "location_id": secret.id }),
            )
            .await;
        let post = app
            .send(Method::GET, &format!("/api/posts/{id}"), None, None)
            .await;
        assert_eq!(post.status, StatusCode::OK);
        assert_eq!(post.body["location"], Value::Null);

        let unknown = app
            .send(
                Method::POST,
                "/api/posts",
                Some(&author),
                Some(json!({ "title": "t", "text": "x", "category_id": 999 })),
            )
            .await;
        assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn body_is_judged_only_after_authentication_and_ownership() {
        let app = TestApp::new();
        let author = app.register("author").await;
        let reader = app.register("reader").await;
        let id = app
            .create_post(&author, json!({ "title": "mine", "text": "body" }))
            .await;
        let uri = format!("/api/posts/{id}");
        let incomplete = json!({ "text": "x" });

        for body in [Some(incomplete.clone()), None] {
            let anonymous = app.send(Method::PUT, &uri, None, body.clone()).await;
            assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
            assert_eq!(anonymous.location(), Some("/api/auth/login"));

            let stranger = app.send(Method::PUT, &uri, Some(&reader), body).await;
            assert_eq!(stranger.status, StatusCode::FORBIDDEN);
            assert_eq!(stranger.body["error"], "you are not the author of this object");
        }

        let missing = app
            .send(
                Method::PUT,
                &format!("/api/posts/{}", id + 1000),
                Some(&author),
                None,
            )
            .await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let owner = app
            .send(Method::PUT, &uri, Some(&author), Some(incomplete))
            .await;
        assert_eq!(owner.status, StatusCode::BAD_REQUEST);
        assert!(owner.body["error"].is_string());
        let owner_no_body = app.send(Method::PUT, &uri, Some(&author), None).await;
        assert_eq!(owner_no_body.status, StatusCode::BAD_REQUEST);
        assert!(owner_no_body.body["error"].is_string());
    }

    #[tokio::test]
    async fn anonymous_writes_with_bad_bodies_still_ask_to_log_in() {
        let app = TestApp::new();
        let author = app.register("author").await;
        let id = app
            .create_post(&author, json!({ "title": "mine", "text": "body" }))
            .await;
        let comment = app
            .send(
                Method::POST,
                &format!("/api/posts/{id}/comments"),
                Some(&author),
                Some(json!({ "text": "first" })),
            )
            .await;
        let comment_id = comment.body["id"].as_i64().expect("comment id");

        let attempts = [
            (Method::POST, "/api/posts".to_string()),
            (Method::POST, format!("/api/posts/{id}/comments")),
            (Method::PUT, format!("/api/posts/{id}/comments/{comment_id}")),
            (Method::PUT, "/api/profile".to_string()),
        ];
        for (method, uri) in attempts {
            let response = app.send(method, &uri, None, Some(json!({}))).await;
            assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(response.body["login_url"], "/api/auth/login");
        }

        let reader = app.register("reader").await;
        let stranger = app
            .send(
                Method::PUT,
                &format!("/api/posts/{id}/comments/{comment_id}"),
                Some(&reader),
                Some(json!({})),
            )
            .await;
        assert_eq!(stranger.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn login_by_email_returns_a_bearer_session() {
        let app = TestApp::new();
        app.register("writer").await;

        let response = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "login": "Writer@Example.com", "password": "very-secure-password" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["token_type"], "Bearer");
        assert_eq!(response.body["expires_in"], 3600);
        assert_eq!(response.body["user"]["username"], "writer");

        let malformed = app
            .send(Method::POST, "/api/auth/login", None, None)
            .await;
        assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
        assert!(malformed.body["error"].is_string());
    }
}
