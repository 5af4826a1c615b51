use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::catalog::{CategoryRef, LocationRef};
use crate::domain::error::DomainError;
use crate::domain::listing::{Pagination, PostFilter, PostVisibility};
use crate::domain::post::{Post, PostSummary};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str = r#"
    SELECT
        p.id,
        p.title,
        p.text,
        p.image,
        p.pub_date,
        p.is_published,
        p.author_id,
        u.username AS author_username,
        c.id AS category_id,
        c.title AS category_title,
        c.slug AS category_slug,
        c.is_published AS category_is_published,
        l.id AS location_id,
        l.name AS location_name,
        l.is_published AS location_is_published,
        p.created_at,
        p.updated_at
"#;

const POST_JOINS: &str = r#"
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

// $1 category, $2 author, $3 "now" for public listings (NULL = unrestricted)
const POST_FILTER: &str = r#"
    ($1::BIGINT IS NULL OR p.category_id = $1)
    AND ($2::BIGINT IS NULL OR p.author_id = $2)
    AND (
        $3::TIMESTAMPTZ IS NULL
        OR (
            p.is_published
            AND p.pub_date <= $3
            AND (c.id IS NULL OR c.is_published)
        )
    )
"#;

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    text: String,
    image: Option<String>,
    pub_date: DateTime<Utc>,
    is_published: bool,
    author_id: i64,
    author_username: String,
    category_id: Option<i64>,
    category_title: Option<String>,
    category_slug: Option<String>,
    category_is_published: Option<bool>,
    location_id: Option<i64>,
    location_name: Option<String>,
    location_is_published: Option<bool>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PostSummaryRow {
    #[sqlx(flatten)]
    post: PostRow,
    comment_count: i64,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let sql = format!(
            r#"
            WITH p AS (
                INSERT INTO posts
                    (title, text, image, pub_date, is_published, author_id, category_id, location_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            {POST_COLUMNS}
            FROM p
            {POST_JOINS}
            "#
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(&input.title)
            .bind(&input.text)
            .bind(&input.image)
            .bind(input.pub_date)
            .bind(input.is_published)
            .bind(input.author_id)
            .bind(input.category_id)
            .bind(input.location_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            {POST_COLUMNS}
            FROM posts p
            {POST_JOINS}
            WHERE p.id = $1
            "#
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            WITH p AS (
                UPDATE posts
                SET title = $3,
                    text = $4,
                    image = $5,
                    pub_date = $6,
                    is_published = $7,
                    category_id = $8,
                    location_id = $9,
                    updated_at = NOW()
                WHERE id = $1 AND author_id = $2
                RETURNING *
            )
            {POST_COLUMNS}
            FROM p
            {POST_JOINS}
            "#
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post_id)
            .bind(owner_id)
            .bind(&patch.title)
            .bind(&patch.text)
            .bind(&patch.image)
            .bind(patch.pub_date)
            .bind(patch.is_published)
            .bind(patch.category_id)
            .bind(patch.location_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        // comments go away through ON DELETE CASCADE
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<PostSummary>, DomainError> {
        let sql = format!(
            r#"
            {POST_COLUMNS},
                (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
            FROM posts p
            {POST_JOINS}
            WHERE {POST_FILTER}
            ORDER BY p.pub_date DESC, p.id DESC
            LIMIT $4
            OFFSET $5
            "#
        );

        let rows = sqlx::query_as::<_, PostSummaryRow>(&sql)
            .bind(filter.category_id)
            .bind(filter.author_id)
            .bind(visible_at(&filter))
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(PostSummary {
                    post: map_row_to_post(row.post)?,
                    comment_count: row.comment_count,
                })
            })
            .collect()
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64, DomainError> {
        let sql = format!(
            r#"
            SELECT COUNT(*)
            FROM posts p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE {POST_FILTER}
            "#
        );

        sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.category_id)
            .bind(filter.author_id)
            .bind(visible_at(&filter))
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }
}

fn visible_at(filter: &PostFilter) -> Option<DateTime<Utc>> {
    match filter.visibility {
        PostVisibility::PublicAt(now) => Some(now),
        PostVisibility::Unrestricted => None,
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let category = match (
        row.category_id,
        row.category_title,
        row.category_slug,
        row.category_is_published,
    ) {
        (Some(id), Some(title), Some(slug), Some(is_published)) => Some(CategoryRef {
            id,
            title,
            slug,
            is_published,
        }),
        _ => None,
    };
    let location = match (row.location_id, row.location_name, row.location_is_published) {
        (Some(id), Some(name), Some(is_published)) => Some(LocationRef {
            id,
            name,
            is_published,
        }),
        _ => None,
    };

    Post {
        id: row.id,
        title: row.title,
        text: row.text,
        image: row.image,
        pub_date: row.pub_date,
        is_published: row.is_published,
        author_id: row.author_id,
        author_username: row.author_username,
        category,
        location,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
    .ensure_consistent()
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        let resource = match db_err.constraint() {
            Some("posts_category_id_fkey") => "category",
            Some("posts_location_id_fkey") => "location",
            _ => "author",
        };
        return DomainError::NotFound(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
