use std::sync::Arc;

use sqlx::PgPool;

use catalog_repository::CatalogRepository;
use comment_repository::CommentRepository;
use post_repository::PostRepository;
use repositories::memory::MemoryStore;
use repositories::postgres::catalog_repository::PostgresCatalogRepository;
use repositories::postgres::comment_repository::PostgresCommentRepository;
use repositories::postgres::post_repository::PostgresPostRepository;
use repositories::postgres::user_repository::PostgresUserRepository;
use user_repository::UserRepository;

pub(crate) mod catalog_repository;
pub(crate) mod comment_repository;
pub(crate) mod post_repository;
pub(crate) mod repositories;
pub(crate) mod user_repository;

#[derive(Clone)]
pub(crate) struct Repositories {
    pub(crate) users: Arc<dyn UserRepository>,
    pub(crate) posts: Arc<dyn PostRepository>,
    pub(crate) comments: Arc<dyn CommentRepository>,
    pub(crate) catalog: Arc<dyn CatalogRepository>,
}

impl Repositories {
    pub(crate) fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            posts: Arc::new(PostgresPostRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
            catalog: Arc::new(PostgresCatalogRepository::new(pool)),
        }
    }

    pub(crate) fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            catalog: store,
        }
    }
}
