use async_trait::async_trait;
use chrono::Utc;

use super::{MemoryStore, PostRecord};
use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::listing::{Pagination, PostFilter};
use crate::domain::post::{Post, PostSummary};

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut tables = self.tables.write().await;
        tables.ensure_references(input.author_id, input.category_id, input.location_id)?;

        let id = tables.next_id();
        let now = Utc::now();
        let record = PostRecord {
            id,
            title: input.title,
            text: input.text,
            image: input.image,
            pub_date: input.pub_date,
            is_published: input.is_published,
            author_id: input.author_id,
            category_id: input.category_id,
            location_id: input.location_id,
            created_at: now,
            updated_at: now,
        };
        let post = tables.hydrate_post(&record)?;
        tables.posts.insert(id, record);
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let tables = self.tables.read().await;
        tables
            .posts
            .get(&id)
            .map(|record| tables.hydrate_post(record))
            .transpose()
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let mut tables = self.tables.write().await;
        tables.ensure_references(owner_id, patch.category_id, patch.location_id)?;

        let Some(record) = tables.posts.get_mut(&post_id) else {
            return Ok(None);
        };
        if record.author_id != owner_id {
            return Ok(None);
        }

        record.title = patch.title;
        record.text = patch.text;
        record.image = patch.image;
        record.pub_date = patch.pub_date;
        record.is_published = patch.is_published;
        record.category_id = patch.category_id;
        record.location_id = patch.location_id;
        record.updated_at = Utc::now().max(record.created_at);

        let record = record.clone();
        tables.hydrate_post(&record).map(Some)
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        if tables.posts.remove(&id).is_none() {
            return Ok(false);
        }
        tables.comments.retain(|_, comment| comment.post_id != id);
        Ok(true)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<PostSummary>, DomainError> {
        let tables = self.tables.read().await;

        let mut posts = tables
            .posts
            .values()
            .map(|record| tables.hydrate_post(record))
            .collect::<Result<Vec<_>, _>>()?;
        posts.retain(|post| filter.matches(post));
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));

        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit()).unwrap_or(usize::MAX);

        Ok(posts
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|post| PostSummary {
                comment_count: tables.comment_count(post.id),
                post,
            })
            .collect())
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64, DomainError> {
        let tables = self.tables.read().await;
        let mut count = 0;
        for record in tables.posts.values() {
            if filter.matches(&tables.hydrate_post(record)?) {
                count += 1;
            }
        }
        Ok(count)
    }
}
