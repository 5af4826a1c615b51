use async_trait::async_trait;

use crate::domain::catalog::{Category, Location, NewCategory, NewLocation};
use crate::domain::error::DomainError;

#[async_trait]
pub(crate) trait CatalogRepository: Send + Sync {
    async fn list_categories(&self, published_only: bool) -> Result<Vec<Category>, DomainError>;
    async fn get_category(&self, id: i64) -> Result<Option<Category>, DomainError>;
    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError>;
    async fn upsert_category(&self, input: NewCategory) -> Result<Category, DomainError>;
    async fn list_locations(&self, published_only: bool) -> Result<Vec<Location>, DomainError>;
    async fn get_location(&self, id: i64) -> Result<Option<Location>, DomainError>;
    async fn upsert_location(&self, input: NewLocation) -> Result<Location, DomainError>;
}
