use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{BlogClientError, BlogClientResult};
use crate::models::{
    AuthResponse, Category, CategoryPosts, Comment, Location, Post, PostDetail, PostInput,
    PostPage, ProfileInput, ProfilePage, User,
};

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    login: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CommentRequestDto<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
}

#[derive(Serialize)]
struct PageQuery {
    page: u32,
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API `blogicum-server`.
pub(crate) struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт новый HTTP-клиент с базовым URL сервера.
    pub(crate) fn new(base_url: impl Into<String>) -> BlogClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn decode_error(response: Response) -> BlogClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body.error,
            Err(_) => None,
        };
        BlogClientError::from_http_status(status, message)
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(request: RequestBuilder) -> BlogClientResult<Response> {
        let response = request
            .send()
            .await
            .map_err(BlogClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(request: RequestBuilder) -> BlogClientResult<T> {
        Self::execute(request)
            .await?
            .json::<T>()
            .await
            .map_err(BlogClientError::from_reqwest)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        page: u32,
        token: Option<&str>,
    ) -> BlogClientResult<T> {
        let request = self
            .request(Method::GET, path, token)
            .query(&PageQuery { page });
        Self::decode(request).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> BlogClientResult<T> {
        Self::decode(self.request(Method::GET, path, token)).await
    }

    async fn send_json<TReq, TRes>(
        &self,
        method: Method,
        path: &str,
        body: &TReq,
        token: Option<&str>,
    ) -> BlogClientResult<TRes>
    where
        TReq: Serialize,
        TRes: DeserializeOwned,
    {
        Self::decode(self.request(method, path, token).json(body)).await
    }

    async fn delete(&self, path: &str, token: &str) -> BlogClientResult<()> {
        Self::execute(self.request(Method::DELETE, path, Some(token))).await?;
        Ok(())
    }

    pub(crate) async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> BlogClientResult<AuthResponse> {
        let payload = RegisterRequestDto {
            username,
            email,
            password,
        };
        self.send_json(Method::POST, "/api/auth/register", &payload, None)
            .await
    }

    pub(crate) async fn login(&self, login: &str, password: &str) -> BlogClientResult<AuthResponse> {
        let payload = LoginRequestDto { login, password };
        self.send_json(Method::POST, "/api/auth/login", &payload, None)
            .await
    }

    pub(crate) async fn list_posts(&self, page: u32, token: Option<&str>) -> BlogClientResult<PostPage> {
        self.get_page("/api/posts", page, token).await
    }

    pub(crate) async fn get_post(&self, id: i64, token: Option<&str>) -> BlogClientResult<PostDetail> {
        self.get(&format!("/api/posts/{id}"), token).await
    }

    pub(crate) async fn create_post(&self, token: &str, input: &PostInput) -> BlogClientResult<Post> {
        self.send_json(Method::POST, "/api/posts", input, Some(token))
            .await
    }

    pub(crate) async fn update_post(
        &self,
        token: &str,
        id: i64,
        input: &PostInput,
    ) -> BlogClientResult<Post> {
        self.send_json(Method::PUT, &format!("/api/posts/{id}"), input, Some(token))
            .await
    }

    pub(crate) async fn delete_post(&self, token: &str, id: i64) -> BlogClientResult<()> {
        self.delete(&format!("/api/posts/{id}"), token).await
    }

    pub(crate) async fn list_comments(
        &self,
        post_id: i64,
        token: Option<&str>,
    ) -> BlogClientResult<Vec<Comment>> {
        self.get(&format!("/api/posts/{post_id}/comments"), token)
            .await
    }

    pub(crate) async fn add_comment(
        &self,
        token: &str,
        post_id: i64,
        text: &str,
    ) -> BlogClientResult<Comment> {
        self.send_json(
            Method::POST,
            &format!("/api/posts/{post_id}/comments"),
            &CommentRequestDto { text },
            Some(token),
        )
        .await
    }

    pub(crate) async fn update_comment(
        &self,
        token: &str,
        post_id: i64,
        comment_id: i64,
        text: &str,
    ) -> BlogClientResult<Comment> {
        self.send_json(
            Method::PUT,
            &format!("/api/posts/{post_id}/comments/{comment_id}"),
            &CommentRequestDto { text },
            Some(token),
        )
        .await
    }

    pub(crate) async fn delete_comment(
        &self,
        token: &str,
        post_id: i64,
        comment_id: i64,
    ) -> BlogClientResult<()> {
        self.delete(&format!("/api/posts/{post_id}/comments/{comment_id}"), token)
            .await
    }

    pub(crate) async fn list_categories(&self) -> BlogClientResult<Vec<Category>> {
        self.get("/api/categories", None).await
    }

    pub(crate) async fn category_posts(
        &self,
        slug: &str,
        page: u32,
        token: Option<&str>,
    ) -> BlogClientResult<CategoryPosts> {
        self.get_page(&format!("/api/categories/{slug}/posts"), page, token)
            .await
    }

    pub(crate) async fn list_locations(&self) -> BlogClientResult<Vec<Location>> {
        self.get("/api/locations", None).await
    }

    pub(crate) async fn get_profile(
        &self,
        username: &str,
        page: u32,
        token: Option<&str>,
    ) -> BlogClientResult<ProfilePage> {
        self.get_page(&format!("/api/profiles/{username}"), page, token)
            .await
    }

    pub(crate) async fn update_profile(
        &self,
        token: &str,
        input: &ProfileInput,
    ) -> BlogClientResult<User> {
        self.send_json(Method::PUT, "/api/profile", input, Some(token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalizes_slashes() {
        let client = HttpClient::new("http://localhost:8080/").expect("client must build");
        let full = client.endpoint("/api/posts");
        assert_eq!(full, "http://localhost:8080/api/posts");
    }

    #[test]
    fn post_page_reads_flattened_summaries() {
        let raw = r#"{
            "posts": [{
                "id": 1,
                "title": "t",
                "text": "x",
                "image": null,
                "pub_date": "2025-01-01T10:00:00Z",
                "is_published": true,
                "author_id": 2,
                "author_username": "writer",
                "category": {"id": 3, "title": "Travel", "slug": "travel"},
                "location": null,
                "created_at": "2025-01-01T10:00:00Z",
                "updated_at": "2025-01-01T10:00:00Z",
                "comment_count": 4
            }],
            "page": 1,
            "page_size": 10,
            "total": 1,
            "num_pages": 1
        }"#;

        let page: PostPage = serde_json::from_str(raw).expect("page must parse");
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.posts[0].comment_count, 4);
        assert_eq!(page.posts[0].post.author_username, "writer");
        assert_eq!(
            page.posts[0].post.category.as_ref().map(|c| c.slug.as_str()),
            Some("travel")
        );
    }

    #[test]
    fn post_input_skips_unset_fields() {
        let input = PostInput {
            title: "t".to_string(),
            text: "x".to_string(),
            category_id: Some(3),
            ..PostInput::default()
        };
        let value = serde_json::to_value(&input).expect("must serialize");
        assert_eq!(value["category_id"], 3);
        assert!(value.get("pub_date").is_none());
        assert!(value.get("location_id").is_none());
    }
}
