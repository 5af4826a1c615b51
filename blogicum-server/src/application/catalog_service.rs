use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::data::catalog_repository::CatalogRepository;
use crate::domain::catalog::{Category, Location, NewCategory, NewLocation};
use crate::domain::error::DomainError;

/// Categories and locations managed outside of the public API.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CatalogImport {
    #[serde(default)]
    pub(crate) categories: Vec<NewCategory>,
    #[serde(default)]
    pub(crate) locations: Vec<NewLocation>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ImportSummary {
    pub(crate) categories: usize,
    pub(crate) locations: usize,
}

pub(crate) struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub(crate) fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self { repo }
    }

    pub(crate) async fn published_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.repo.list_categories(true).await
    }

    pub(crate) async fn published_locations(&self) -> Result<Vec<Location>, DomainError> {
        self.repo.list_locations(true).await
    }

    /// Upserts every entry, categories by slug and locations by name.
    /// Nothing is written if any entry is invalid.
    pub(crate) async fn import(&self, input: CatalogImport) -> Result<ImportSummary, DomainError> {
        let categories = input
            .categories
            .into_iter()
            .map(NewCategory::validate)
            .collect::<Result<Vec<_>, _>>()?;
        let locations = input
            .locations
            .into_iter()
            .map(NewLocation::validate)
            .collect::<Result<Vec<_>, _>>()?;

        let summary = ImportSummary {
            categories: categories.len(),
            locations: locations.len(),
        };
        for category in categories {
            self.repo.upsert_category(category).await?;
        }
        for location in locations {
            self.repo.upsert_location(location).await?;
        }

        info!(
            categories = summary.categories,
            locations = summary.locations,
            "catalog imported"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogImport, CatalogService, ImportSummary};
    use crate::data::Repositories;
    use crate::domain::error::DomainError;

    fn import(json: &str) -> CatalogImport {
        serde_json::from_str(json).expect("fixture must parse")
    }

    #[tokio::test]
    async fn import_is_idempotent_and_listing_hides_unpublished() {
        let repos = Repositories::in_memory();
        let service = CatalogService::new(repos.catalog.clone());
        let fixture = r#"{
            "categories": [
                {"title": "Travel", "description": "Trips", "slug": "travel"},
                {"title": "Drafts", "description": "Hidden", "slug": "drafts", "is_published": false}
            ],
            "locations": [{"name": "Moscow"}, {"name": "Nowhere", "is_published": false}]
        }"#;

        let summary = service.import(import(fixture)).await.expect("import");
        assert_eq!(
            summary,
            ImportSummary {
                categories: 2,
                locations: 2
            }
        );
        service.import(import(fixture)).await.expect("re-import");

        let categories = service.published_categories().await.expect("categories");
        let slugs: Vec<&str> = categories.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["travel"]);

        let all = repos.catalog.list_categories(false).await.expect("all");
        assert_eq!(all.len(), 2);

        let locations = service.published_locations().await.expect("locations");
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].name, "Moscow");
    }

    #[tokio::test]
    async fn invalid_entry_aborts_import() {
        let repos = Repositories::in_memory();
        let service = CatalogService::new(repos.catalog.clone());
        let fixture = r#"{
            "categories": [
                {"title": "Travel", "description": "Trips", "slug": "travel"},
                {"title": "Bad", "description": "Bad", "slug": "has space"}
            ]
        }"#;

        let err = service
            .import(import(fixture))
            .await
            .expect_err("bad slug must fail");
        assert!(matches!(err, DomainError::Validation { field: "slug", .. }));
        assert!(
            repos
                .catalog
                .list_categories(false)
                .await
                .expect("list")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn concurrent_imports_keep_one_location_per_name() {
        let repos = Repositories::in_memory();
        let service = CatalogService::new(repos.catalog.clone());
        let fixture = r#"{"locations": [{"name": "Kazan"}]}"#;

        let (first, second, third) = tokio::join!(
            service.import(import(fixture)),
            service.import(import(fixture)),
            service.import(import(fixture)),
        );
        for result in [first, second, third] {
            result.expect("import must succeed");
        }

        let locations = repos.catalog.list_locations(false).await.expect("list");
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].name, "Kazan");
    }
}
