use std::sync::Arc;

use tracing::{info, warn};

use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{LoginIdentity, LoginRequest, RegisterRequest, User};
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::password::{hash_password, verify_against_decoy, verify_password};

#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub(crate) user: User,
    pub(crate) access_token: String,
    pub(crate) expires_in: i64,
}

pub(crate) struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub(crate) fn new(users: Arc<dyn UserRepository>, jwt: Arc<JwtService>) -> Self {
        Self { users, jwt }
    }

    /// Creates the account and its profile in one step and signs it in.
    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<Session, DomainError> {
        let req = req.validate()?;

        // Cheap conflict checks first; the store still enforces uniqueness.
        if self.users.get_profile(&req.username).await?.is_some() {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }
        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(DomainError::AlreadyExists("email".to_string()));
        }

        let user = self
            .users
            .create_user(NewUser {
                password_hash: hash_password(&req.password)?,
                username: req.username,
                email: req.email,
                first_name: req.first_name.unwrap_or_default(),
                last_name: req.last_name.unwrap_or_default(),
            })
            .await?;
        info!(user_id = user.id, username = %user.username, "user registered");

        self.open_session(user)
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<Session, DomainError> {
        let identity = req.identity()?;

        let Some(credentials) = self.credentials(&identity).await? else {
            verify_against_decoy(&req.password)?;
            warn!(identity = ?identity, "login for unknown account");
            return Err(DomainError::InvalidCredentials);
        };

        verify_password(&req.password, &credentials.password_hash).inspect_err(|_| {
            warn!(user_id = credentials.user.id, "login with wrong password");
        })?;

        self.open_session(credentials.user)
    }

    async fn credentials(
        &self,
        identity: &LoginIdentity,
    ) -> Result<Option<UserCredentials>, DomainError> {
        match identity {
            LoginIdentity::Username(username) => self.users.find_by_username(username).await,
            LoginIdentity::Email(email) => self.users.find_by_email(email).await,
        }
    }

    fn open_session(&self, user: User) -> Result<Session, DomainError> {
        let access_token = self
            .jwt
            .generate_token(user.id, &user.username)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Session {
            user,
            access_token,
            expires_in: self.jwt.ttl_seconds(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::AuthService;
    use crate::data::Repositories;
    use crate::domain::error::DomainError;
    use crate::domain::user::{LoginRequest, RegisterRequest};
    use crate::infrastructure::jwt::JwtService;

    const PASSWORD: &str = "very-secure-password";

    fn service() -> (AuthService, Arc<JwtService>) {
        let jwt = Arc::new(JwtService::new("0123456789abcdef0123456789abcdef", 900));
        let repos = Repositories::in_memory();
        (AuthService::new(repos.users.clone(), jwt.clone()), jwt)
    }

    fn register_request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
            first_name: Some("  Anna ".to_string()),
            last_name: None,
        }
    }

    fn login(login: &str, password: &str) -> LoginRequest {
        LoginRequest {
            login: login.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_creates_profile_and_signs_in() {
        let (service, jwt) = service();

        let session = service
            .register(register_request("  writer  ", "  WRITER@EXAMPLE.COM "))
            .await
            .expect("register must succeed");

        assert_eq!(session.user.username, "writer");
        assert_eq!(session.user.email, "writer@example.com");
        assert_eq!(session.user.first_name, "Anna");
        assert_eq!(session.user.last_name, "");
        assert_eq!(session.expires_in, 900);

        let claims = jwt
            .verify_token(&session.access_token)
            .expect("issued token must verify");
        assert_eq!(claims.user_id, session.user.id);
        assert_eq!(claims.username, "writer");
    }

    #[tokio::test]
    async fn register_reports_which_field_is_taken() {
        let (service, _) = service();
        service
            .register(register_request("writer", "writer@example.com"))
            .await
            .expect("first register must succeed");

        let err = service
            .register(register_request("writer", "other@example.com"))
            .await
            .expect_err("duplicate username must fail");
        assert!(matches!(err, DomainError::AlreadyExists(field) if field == "username"));

        let err = service
            .register(register_request("reader", "Writer@Example.com"))
            .await
            .expect_err("duplicate email must fail");
        assert!(matches!(err, DomainError::AlreadyExists(field) if field == "email"));
    }

    #[tokio::test]
    async fn login_accepts_username_or_email() {
        let (service, _) = service();
        let registered = service
            .register(register_request("writer", "writer@example.com"))
            .await
            .expect("register must succeed");

        let by_name = service
            .login(login("writer", PASSWORD))
            .await
            .expect("login by username must succeed");
        let by_email = service
            .login(login("Writer@Example.com", PASSWORD))
            .await
            .expect("login by email must succeed");

        assert_eq!(by_name.user.id, registered.user.id);
        assert_eq!(by_email.user.id, registered.user.id);
        assert!(!by_email.access_token.is_empty());
    }

    #[tokio::test]
    async fn unknown_account_and_wrong_password_look_the_same() {
        let (service, _) = service();
        service
            .register(register_request("writer", "writer@example.com"))
            .await
            .expect("register must succeed");

        let unknown = service
            .login(login("nobody", PASSWORD))
            .await
            .expect_err("unknown account must fail");
        let wrong = service
            .login(login("writer", "wrong-password"))
            .await
            .expect_err("wrong password must fail");

        assert!(matches!(unknown, DomainError::InvalidCredentials));
        assert!(matches!(wrong, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_validates_before_lookup() {
        let (service, _) = service();
        let err = service
            .login(login("writer", ""))
            .await
            .expect_err("empty password must fail");
        assert!(matches!(err, DomainError::Validation { field: "password", .. }));
    }
}
