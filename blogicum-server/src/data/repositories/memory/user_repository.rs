use async_trait::async_trait;
use chrono::Utc;

use super::{MemoryStore, UserRecord};
use crate::data::user_repository::{NewUser, ProfilePatch, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::User;

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;

        for record in tables.users.values() {
            if record.user.username == input.username {
                return Err(DomainError::AlreadyExists("username".to_string()));
            }
            if record.user.email == input.email {
                return Err(DomainError::AlreadyExists("email".to_string()));
            }
        }

        let id = tables.next_id();
        let user = User::new(id, input.username, input.email, Utc::now())
            .map_err(|err| DomainError::Unexpected(err.to_string()))?
            .with_names(input.first_name, input.last_name);
        tables.users.insert(
            id,
            UserRecord {
                user: user.clone(),
                password_hash: input.password_hash,
            },
        );
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|record| record.user.username == username)
            .map(|record| UserCredentials {
                user: record.user.clone(),
                password_hash: record.password_hash.clone(),
            }))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|record| record.user.email == email)
            .map(|record| UserCredentials {
                user: record.user.clone(),
                password_hash: record.password_hash.clone(),
            }))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|record| record.user.clone()))
    }

    async fn get_profile(&self, username: &str) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|record| record.user.username == username)
            .map(|record| record.user.clone()))
    }

    async fn update_profile(
        &self,
        id: i64,
        patch: ProfilePatch,
    ) -> Result<Option<User>, DomainError> {
        let mut tables = self.tables.write().await;

        for (other_id, record) in &tables.users {
            if *other_id == id {
                continue;
            }
            if record.user.username == patch.username {
                return Err(DomainError::AlreadyExists("username".to_string()));
            }
            if record.user.email == patch.email {
                return Err(DomainError::AlreadyExists("email".to_string()));
            }
        }

        let Some(record) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        record.user.username = patch.username;
        record.user.email = patch.email;
        record.user.first_name = patch.first_name;
        record.user.last_name = patch.last_name;
        Ok(Some(record.user.clone()))
    }
}
