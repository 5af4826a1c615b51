use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::catalog_repository::CatalogRepository;
use crate::domain::catalog::{Category, Location, NewCategory, NewLocation};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    title: String,
    description: String,
    slug: String,
    is_published: bool,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            slug: row.slug,
            is_published: row.is_published,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LocationRow {
    id: i64,
    name: String,
    is_published: bool,
    created_at: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            is_published: row.is_published,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn list_categories(&self, published_only: bool) -> Result<Vec<Category>, DomainError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            WHERE NOT $1 OR is_published
            ORDER BY title ASC, id ASC
            "#,
        )
        .bind(published_only)
        .fetch_all(&self.pool)
        .await
        .map_err(map_catalog_db_error)?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_catalog_db_error)?;

        Ok(row.map(Category::from))
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_catalog_db_error)?;

        Ok(row.map(Category::from))
    }

    async fn upsert_category(&self, input: NewCategory) -> Result<Category, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (title, description, slug, is_published)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO UPDATE
            SET title = EXCLUDED.title,
                description = EXCLUDED.description,
                is_published = EXCLUDED.is_published
            RETURNING id, title, description, slug, is_published, created_at
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.slug)
        .bind(input.is_published)
        .fetch_one(&self.pool)
        .await
        .map_err(map_catalog_db_error)?;

        Ok(row.into())
    }

    async fn list_locations(&self, published_only: bool) -> Result<Vec<Location>, DomainError> {
        let rows = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT id, name, is_published, created_at
            FROM locations
            WHERE NOT $1 OR is_published
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(published_only)
        .fetch_all(&self.pool)
        .await
        .map_err(map_catalog_db_error)?;

        Ok(rows.into_iter().map(Location::from).collect())
    }

    async fn get_location(&self, id: i64) -> Result<Option<Location>, DomainError> {
        let row = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT id, name, is_published, created_at
            FROM locations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_catalog_db_error)?;

        Ok(row.map(Location::from))
    }

    async fn upsert_location(&self, input: NewLocation) -> Result<Location, DomainError> {
        let row = sqlx::query_as::<_, LocationRow>(UPSERT_LOCATION_SQL)
            .bind(&input.name)
            .bind(input.is_published)
            .fetch_one(&self.pool)
            .await
            .map_err(map_catalog_db_error)?;

        Ok(row.into())
    }
}

const UPSERT_LOCATION_SQL: &str = r#"
    INSERT INTO locations (name, is_published)
    VALUES ($1, $2)
    ON CONFLICT (name) DO UPDATE
    SET is_published = EXCLUDED.is_published
    RETURNING id, name, is_published, created_at
"#;

fn map_catalog_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        let field = match db_err.constraint() {
            Some("locations_name_key") => "location name",
            _ => "category slug",
        };
        return DomainError::AlreadyExists(field.to_string());
    }
    DomainError::Unexpected(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::UPSERT_LOCATION_SQL;

    const CATALOG_MIGRATION: &str =
        include_str!("../../../../migrations/20250121000002_create_catalog.sql");

    #[test]
    fn location_upsert_is_a_single_statement_keyed_by_unique_name() {
        assert!(CATALOG_MIGRATION.contains("CONSTRAINT locations_name_key UNIQUE (name)"));
        assert!(UPSERT_LOCATION_SQL.contains("ON CONFLICT (name) DO UPDATE"));
        assert!(!UPSERT_LOCATION_SQL.contains("UPDATE locations"));
    }
}
