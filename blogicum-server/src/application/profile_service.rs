use std::sync::Arc;

use tracing::info;

use crate::data::user_repository::{ProfilePatch, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{UpdateProfileRequest, User};
use crate::domain::viewer::Viewer;

pub(crate) struct ProfileService {
    repo: Arc<dyn UserRepository>,
}

impl ProfileService {
    pub(crate) fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Edits the viewer's own profile. There is no way to address another user.
    pub(crate) async fn update_profile(
        &self,
        viewer: &Viewer,
        req: UpdateProfileRequest,
    ) -> Result<User, DomainError> {
        let user_id = viewer.require_authenticated()?;
        let req = req.validate()?;

        let patch = ProfilePatch {
            username: req.username,
            email: req.email,
            first_name: req.first_name.unwrap_or_default(),
            last_name: req.last_name.unwrap_or_default(),
        };
        let user = self
            .repo
            .update_profile(user_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))?;
        info!(user_id, username = %user.username, "profile updated");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::ProfileService;
    use crate::application::blog_service::tests::Fixture;
    use crate::domain::error::DomainError;
    use crate::domain::user::UpdateProfileRequest;
    use crate::domain::viewer::Viewer;

    fn request(username: &str, email: &str) -> UpdateProfileRequest {
        UpdateProfileRequest {
            username: username.to_string(),
            email: email.to_string(),
            first_name: Some("Anna".to_string()),
            last_name: None,
        }
    }

    #[tokio::test]
    async fn anonymous_cannot_edit_profile() {
        let fx = Fixture::new();
        let service = ProfileService::new(fx.repos.users.clone());

        let err = service
            .update_profile(&Viewer::Anonymous, request("writer", "w@example.com"))
            .await
            .expect_err("anonymous must authenticate");
        assert!(matches!(err, DomainError::AuthenticationRequired));
    }

    #[tokio::test]
    async fn update_changes_own_profile_and_rejects_taken_username() {
        let fx = Fixture::new();
        let author = fx.user("author").await;
        fx.user("reader").await;
        let service = ProfileService::new(fx.repos.users.clone());

        let user = service
            .update_profile(
                &Viewer::User(author.id),
                request(" writer ", "Writer@Example.com"),
            )
            .await
            .expect("profile must update");
        assert_eq!(user.id, author.id);
        assert_eq!(user.username, "writer");
        assert_eq!(user.email, "writer@example.com");
        assert_eq!(user.first_name, "Anna");
        assert_eq!(user.last_name, "");

        let err = service
            .update_profile(&Viewer::User(author.id), request("reader", "x@example.com"))
            .await
            .expect_err("username is taken");
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }
}
