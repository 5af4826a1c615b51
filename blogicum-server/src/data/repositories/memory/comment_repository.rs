use async_trait::async_trait;
use chrono::Utc;

use super::{CommentRecord, MemoryStore};
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&input.post_id) {
            return Err(DomainError::NotFound("post".to_string()));
        }
        if !tables.users.contains_key(&input.author_id) {
            return Err(DomainError::NotFound("author".to_string()));
        }

        let id = tables.next_id();
        let record = CommentRecord {
            id,
            post_id: input.post_id,
            author_id: input.author_id,
            text: input.text,
            created_at: Utc::now(),
        };
        let comment = tables.hydrate_comment(&record)?;
        tables.comments.insert(id, record);
        Ok(comment)
    }

    async fn get_comment(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Option<Comment>, DomainError> {
        let tables = self.tables.read().await;
        tables
            .comments
            .get(&comment_id)
            .filter(|record| record.post_id == post_id)
            .map(|record| tables.hydrate_comment(record))
            .transpose()
    }

    async fn update_comment(
        &self,
        comment_id: i64,
        text: String,
    ) -> Result<Option<Comment>, DomainError> {
        let mut tables = self.tables.write().await;
        let Some(record) = tables.comments.get_mut(&comment_id) else {
            return Ok(None);
        };
        record.text = text;

        let record = record.clone();
        tables.hydrate_comment(&record).map(Some)
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        Ok(tables.comments.remove(&comment_id).is_some())
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let tables = self.tables.read().await;
        let mut records = tables
            .comments
            .values()
            .filter(|record| record.post_id == post_id)
            .collect::<Vec<_>>();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        records
            .into_iter()
            .map(|record| tables.hydrate_comment(record))
            .collect()
    }
}
