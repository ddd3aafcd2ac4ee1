//! User service for registration and authentication

use std::sync::Arc;

use tracing::info;

use crate::domain::user::{
    validate_full_name, validate_password, validate_username, User, UserId, UserRepository,
};
use crate::domain::{DomainError, Email};

use super::password::PasswordHasher;

/// Request for registering a new user
#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// User service for registration and authentication
#[derive(Debug)]
pub struct UserService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

impl<R: UserRepository, H: PasswordHasher> UserService<R, H> {
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }

    /// Register a new user account
    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, DomainError> {
        info!(username = %request.username, "Registering user");

        validate_username(&request.username)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        validate_full_name(&request.full_name)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let email =
            Email::parse(&request.email).map_err(|e| DomainError::validation(e.to_string()))?;

        if self
            .repository
            .get_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict("Username already exists"));
        }

        if self.repository.get_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict("Email already exists"));
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let user = User::new(&request.username, email, &request.full_name, password_hash);

        self.repository.create(user).await
    }

    /// Authenticate by username and password.
    ///
    /// Returns None for unknown users, wrong passwords and suspended
    /// accounts alike - callers surface a single uniform failure.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let user = match self.repository.get_by_username(username).await? {
            Some(u) => u,
            None => return Ok(None),
        };

        if !user.is_active() {
            return Ok(None);
        }

        if !self.hasher.verify(password, user.password_hash()) {
            return Ok(None);
        }

        self.repository.record_login(user.id()).await?;

        self.repository.get(user.id()).await
    }

    /// Get a user by ID
    pub async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.repository.get(id).await
    }

    /// Get a user by normalized email
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, DomainError> {
        self.repository.get_by_email(email).await
    }

    /// Count registered users
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryStore;
    use crate::infrastructure::user::{Argon2Hasher, MemoryUserRepository};

    fn create_service() -> UserService<MemoryUserRepository, Argon2Hasher> {
        let repository = Arc::new(MemoryUserRepository::new(MemoryStore::new()));
        let hasher = Arc::new(Argon2Hasher::new());
        UserService::new(repository, hasher)
    }

    fn make_request(username: &str, email: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "secure_password123".to_string(),
            full_name: "Test User".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register() {
        let service = create_service();

        let user = service
            .register(make_request("alice", "alice@x.com"))
            .await
            .unwrap();

        assert_eq!(user.username(), "alice");
        assert_eq!(user.email().as_str(), "alice@x.com");
        assert!(user.is_active());
        assert_ne!(user.password_hash(), "secure_password123");
    }

    #[tokio::test]
    async fn test_register_normalizes_email() {
        let service = create_service();

        let user = service
            .register(make_request("alice", "  Alice@X.COM "))
            .await
            .unwrap();

        assert_eq!(user.email().as_str(), "alice@x.com");
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let service = create_service();

        service
            .register(make_request("alice", "alice@x.com"))
            .await
            .unwrap();

        let result = service.register(make_request("alice", "other@x.com")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_case_insensitive() {
        let service = create_service();

        service
            .register(make_request("alice", "alice@x.com"))
            .await
            .unwrap();

        let result = service
            .register(make_request("alice2", "ALICE@x.com"))
            .await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_register_invalid_fields() {
        let service = create_service();

        let mut request = make_request("al", "alice@x.com");
        assert!(service.register(request).await.is_err());

        request = make_request("alice", "not-an-email");
        assert!(service.register(request).await.is_err());

        request = make_request("alice", "alice@x.com");
        request.password = "1234".to_string();
        assert!(service.register(request).await.is_err());
    }

    #[tokio::test]
    async fn test_authenticate_success_records_login() {
        let service = create_service();

        service
            .register(make_request("alice", "alice@x.com"))
            .await
            .unwrap();

        let user = service
            .authenticate("alice", "secure_password123")
            .await
            .unwrap();

        assert!(user.is_some());
        assert!(user.unwrap().last_login_at().is_some());
    }

    #[tokio::test]
    async fn test_authenticate_failures_are_uniform() {
        let service = create_service();

        service
            .register(make_request("alice", "alice@x.com"))
            .await
            .unwrap();

        assert!(service
            .authenticate("alice", "wrong_password")
            .await
            .unwrap()
            .is_none());
        assert!(service
            .authenticate("nobody", "secure_password123")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_count() {
        let service = create_service();
        assert_eq!(service.count().await.unwrap(), 0);

        service
            .register(make_request("alice", "alice@x.com"))
            .await
            .unwrap();

        assert_eq!(service.count().await.unwrap(), 1);
    }
}
