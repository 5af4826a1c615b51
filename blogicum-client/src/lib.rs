//! Клиентская библиотека для работы с blogicum-server по HTTP.
//!
//! Клиент хранит JWT-токен после `register`/`login` и передаёт его во всех
//! запросах: защищённые операции без токена не выполняются, а чтение с токеном
//! открывает автору его отложенные и снятые с публикации посты.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{BlogClientError, BlogClientResult};
pub use models::{
    AuthResponse, Category, CategoryPosts, Comment, Location, Post, PostCategory, PostDetail,
    PostInput, PostLocation, PostPage, PostSummary, Profile, ProfileInput, ProfilePage, User,
};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Клиент блог-сервиса.
pub struct BlogClient {
    http_client: HttpClient,
    token: Option<String>,
}

impl BlogClient {
    /// Создаёт клиент для сервера с базовым URL, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> BlogClientResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Устанавливает JWT-токен вручную.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий JWT-токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый JWT-токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Регистрирует пользователя и сохраняет полученный JWT-токен в клиенте.
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> BlogClientResult<AuthResponse> {
        let result = self.http_client.register(username, email, password).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Выполняет вход по логину или email и сохраняет полученный JWT-токен в клиенте.
    pub async fn login(&mut self, login: &str, password: &str) -> BlogClientResult<AuthResponse> {
        let result = self.http_client.login(login, password).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Возвращает страницу ленты опубликованных постов (страницы с 1).
    pub async fn list_posts(&self, page: u32) -> BlogClientResult<PostPage> {
        self.http_client.list_posts(page, self.get_token()).await
    }

    /// Возвращает пост с комментариями.
    ///
    /// Скрытый пост чужого автора неотличим от несуществующего:
    /// оба случая дают [`BlogClientError::NotFound`].
    pub async fn get_post(&self, id: i64) -> BlogClientResult<PostDetail> {
        self.http_client.get_post(id, self.get_token()).await
    }

    /// Создаёт новый пост.
    ///
    /// Требует установленный JWT-токен.
    pub async fn create_post(&self, input: &PostInput) -> BlogClientResult<Post> {
        let token = self.require_token()?;
        self.http_client.create_post(token, input).await
    }

    /// Обновляет пост. Доступно только автору.
    pub async fn update_post(&self, id: i64, input: &PostInput) -> BlogClientResult<Post> {
        let token = self.require_token()?;
        self.http_client.update_post(token, id, input).await
    }

    /// Удаляет пост вместе с комментариями. Доступно только автору.
    pub async fn delete_post(&self, id: i64) -> BlogClientResult<()> {
        let token = self.require_token()?;
        self.http_client.delete_post(token, id).await
    }

    /// Возвращает комментарии доступного поста.
    pub async fn list_comments(&self, post_id: i64) -> BlogClientResult<Vec<Comment>> {
        self.http_client
            .list_comments(post_id, self.get_token())
            .await
    }

    /// Добавляет комментарий к посту.
    pub async fn add_comment(&self, post_id: i64, text: &str) -> BlogClientResult<Comment> {
        let token = self.require_token()?;
        self.http_client.add_comment(token, post_id, text).await
    }

    /// Изменяет комментарий. Доступно только автору комментария.
    pub async fn update_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        text: &str,
    ) -> BlogClientResult<Comment> {
        let token = self.require_token()?;
        self.http_client
            .update_comment(token, post_id, comment_id, text)
            .await
    }

    /// Удаляет комментарий. Доступно только автору комментария.
    pub async fn delete_comment(&self, post_id: i64, comment_id: i64) -> BlogClientResult<()> {
        let token = self.require_token()?;
        self.http_client
            .delete_comment(token, post_id, comment_id)
            .await
    }

    /// Возвращает опубликованные категории.
    pub async fn list_categories(&self) -> BlogClientResult<Vec<Category>> {
        self.http_client.list_categories().await
    }

    /// Возвращает категорию и страницу её постов.
    pub async fn category_posts(&self, slug: &str, page: u32) -> BlogClientResult<CategoryPosts> {
        self.http_client
            .category_posts(slug, page, self.get_token())
            .await
    }

    /// Возвращает опубликованные местоположения.
    pub async fn list_locations(&self) -> BlogClientResult<Vec<Location>> {
        self.http_client.list_locations().await
    }

    /// Возвращает профиль автора и страницу его постов.
    pub async fn get_profile(&self, username: &str, page: u32) -> BlogClientResult<ProfilePage> {
        self.http_client
            .get_profile(username, page, self.get_token())
            .await
    }

    /// Изменяет профиль текущего пользователя.
    pub async fn update_profile(&self, input: &ProfileInput) -> BlogClientResult<User> {
        let token = self.require_token()?;
        self.http_client.update_profile(token, input).await
    }

    fn require_token(&self) -> BlogClientResult<&str> {
        self.token
            .as_deref()
            .ok_or(BlogClientError::AuthenticationRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::{BlogClient, BlogClientError, PostInput};

    #[tokio::test]
    async fn protected_calls_fail_fast_without_token() {
        let client = BlogClient::new("http://127.0.0.1:9").expect("client must build");

        let err = client
            .create_post(&PostInput::default())
            .await
            .expect_err("token is required");
        assert!(matches!(err, BlogClientError::AuthenticationRequired));

        let err = client
            .delete_comment(1, 2)
            .await
            .expect_err("token is required");
        assert!(matches!(err, BlogClientError::AuthenticationRequired));
    }

    #[test]
    fn token_can_be_set_and_cleared() {
        let mut client = BlogClient::new("http://127.0.0.1:9").expect("client must build");
        assert!(client.get_token().is_none());
        client.set_token("abc");
        assert_eq!(client.get_token(), Some("abc"));
        client.clear_token();
        assert!(client.get_token().is_none());
    }
}
