use async_trait::async_trait;
use chrono::Utc;

use super::MemoryStore;
use crate::data::catalog_repository::CatalogRepository;
use crate::domain::catalog::{Category, Location, NewCategory, NewLocation};
use crate::domain::error::DomainError;

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn list_categories(&self, published_only: bool) -> Result<Vec<Category>, DomainError> {
        let tables = self.tables.read().await;
        let mut categories = tables
            .categories
            .values()
            .filter(|category| !published_only || category.is_published)
            .cloned()
            .collect::<Vec<_>>();
        categories.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.get(&id).cloned())
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|category| category.slug == slug)
            .cloned())
    }

    async fn upsert_category(&self, input: NewCategory) -> Result<Category, DomainError> {
        let mut tables = self.tables.write().await;

        if let Some(existing) = tables
            .categories
            .values_mut()
            .find(|category| category.slug == input.slug)
        {
            existing.title = input.title;
            existing.description = input.description;
            existing.is_published = input.is_published;
            return Ok(existing.clone());
        }

        let id = tables.next_id();
        let category = Category {
            id,
            title: input.title,
            description: input.description,
            slug: input.slug,
            is_published: input.is_published,
            created_at: Utc::now(),
        };
        tables.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn list_locations(&self, published_only: bool) -> Result<Vec<Location>, DomainError> {
        let tables = self.tables.read().await;
        let mut locations = tables
            .locations
            .values()
            .filter(|location| !published_only || location.is_published)
            .cloned()
            .collect::<Vec<_>>();
        locations.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(locations)
    }

    async fn get_location(&self, id: i64) -> Result<Option<Location>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.locations.get(&id).cloned())
    }

    async fn upsert_location(&self, input: NewLocation) -> Result<Location, DomainError> {
        let mut tables = self.tables.write().await;

        if let Some(existing) = tables
            .locations
            .values_mut()
            .find(|location| location.name == input.name)
        {
            existing.is_published = input.is_published;
            return Ok(existing.clone());
        }

        let id = tables.next_id();
        let location = Location {
            id,
            name: input.name,
            is_published: input.is_published,
            created_at: Utc::now(),
        };
        tables.locations.insert(id, location.clone());
        Ok(location)
    }
}
