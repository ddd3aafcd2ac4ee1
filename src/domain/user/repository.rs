//! User repository trait

use async_trait::async_trait;

use super::entity::{User, UserId};
use crate::domain::{DomainError, Email};

/// Repository for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync + std::fmt::Debug {
    /// Get a user by ID
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Get a user by normalized email
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, DomainError>;

    /// Create a new user. Fails with `Conflict` when the username or email
    /// is already taken.
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Update an existing user
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Stamp the last-login time
    async fn record_login(&self, id: &UserId) -> Result<(), DomainError>;

    /// Count all users
    async fn count(&self) -> Result<usize, DomainError>;
}
