use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `blogicum-client`.
pub enum BlogClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Нужен вход: токен отсутствует, истёк или отклонён сервером.
    #[error("authentication required")]
    AuthenticationRequired,

    /// Пользователь не является автором объекта.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Ресурс не найден или скрыт от текущего пользователя.
    #[error("not found")]
    NotFound,

    /// Некорректный запрос, ошибка валидации или конфликт.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Результат операций `blogicum-client`.
pub type BlogClientResult<T> = Result<T, BlogClientError>;

impl BlogClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("http status {status}"));
        match status {
            reqwest::StatusCode::UNAUTHORIZED => Self::AuthenticationRequired,
            reqwest::StatusCode::FORBIDDEN => Self::PermissionDenied(message),
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            _ => Self::InvalidRequest(message),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }
}
