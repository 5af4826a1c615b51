use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель пользователя.
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Имя.
    #[serde(default)]
    pub first_name: String,
    /// Фамилия.
    #[serde(default)]
    pub last_name: String,
    /// Дата и время создания пользователя (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ после успешной регистрации или входа.
pub struct AuthResponse {
    /// JWT access token.
    pub access_token: String,
    /// Время жизни токена в секундах.
    #[serde(default)]
    pub expires_in: i64,
    /// Данные пользователя.
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Категория в составе поста.
pub struct PostCategory {
    /// Идентификатор категории.
    pub id: i64,
    /// Заголовок.
    pub title: String,
    /// Слаг для адреса `/api/categories/{slug}/posts`.
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Местоположение в составе поста.
pub struct PostLocation {
    /// Идентификатор местоположения.
    pub id: i64,
    /// Название.
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель поста.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Заголовок поста.
    pub title: String,
    /// Текст поста.
    pub text: String,
    /// Ссылка на изображение.
    pub image: Option<String>,
    /// Дата публикации; может быть в будущем.
    pub pub_date: DateTime<Utc>,
    /// Опубликован ли пост.
    pub is_published: bool,
    /// Идентификатор автора.
    pub author_id: i64,
    /// Логин автора.
    pub author_username: String,
    /// Категория, если задана.
    pub category: Option<PostCategory>,
    /// Местоположение, если задано и опубликовано.
    pub location: Option<PostLocation>,
    /// Дата и время создания поста (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего обновления поста (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Пост в ленте вместе с числом комментариев.
pub struct PostSummary {
    /// Сам пост.
    #[serde(flatten)]
    pub post: Post,
    /// Количество комментариев.
    pub comment_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Страница ленты постов.
pub struct PostPage {
    /// Посты текущей страницы.
    pub posts: Vec<PostSummary>,
    /// Номер страницы, начиная с 1.
    pub page: u32,
    /// Размер страницы.
    pub page_size: u32,
    /// Общее количество постов.
    pub total: i64,
    /// Количество страниц.
    pub num_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Пост вместе с комментариями.
pub struct PostDetail {
    /// Сам пост.
    #[serde(flatten)]
    pub post: Post,
    /// Количество комментариев.
    pub comment_count: i64,
    /// Комментарии, старые первыми.
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Комментарий к посту.
pub struct Comment {
    /// Идентификатор комментария.
    pub id: i64,
    /// Идентификатор поста.
    pub post_id: i64,
    /// Идентификатор автора.
    pub author_id: i64,
    /// Логин автора.
    pub author_username: String,
    /// Текст комментария.
    pub text: String,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Категория.
pub struct Category {
    /// Идентификатор категории.
    pub id: i64,
    /// Заголовок.
    pub title: String,
    /// Описание.
    pub description: String,
    /// Слаг.
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Местоположение.
pub struct Location {
    /// Идентификатор местоположения.
    pub id: i64,
    /// Название.
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Категория и страница её постов.
pub struct CategoryPosts {
    /// Категория.
    pub category: Category,
    /// Страница постов.
    pub posts: PostPage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная часть профиля.
pub struct Profile {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Имя.
    pub first_name: String,
    /// Фамилия.
    pub last_name: String,
    /// Дата регистрации (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Профиль и страница постов автора.
pub struct ProfilePage {
    /// Профиль.
    pub profile: Profile,
    /// Профиль принадлежит текущему пользователю.
    pub is_owner: bool,
    /// Посты автора; владельцу видны и скрытые.
    pub posts: PostPage,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Данные для создания или редактирования поста.
pub struct PostInput {
    /// Заголовок.
    pub title: String,
    /// Текст.
    pub text: String,
    /// Ссылка на изображение.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Дата публикации.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<DateTime<Utc>>,
    /// Флаг публикации.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    /// Идентификатор категории.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    /// Идентификатор местоположения.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Данные для редактирования собственного профиля.
pub struct ProfileInput {
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Имя.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Фамилия.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}
