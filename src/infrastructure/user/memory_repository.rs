//! In-memory user repository

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::{DomainError, Email};
use crate::infrastructure::storage::MemoryStore;

/// In-memory implementation of `UserRepository`
#[derive(Debug, Clone)]
pub struct MemoryUserRepository {
    store: MemoryStore,
}

impl MemoryUserRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let db = self.store.lock()?;
        Ok(db.users.get(id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let db = self.store.lock()?;
        Ok(db
            .users
            .values()
            .find(|u| u.username() == username)
            .cloned())
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, DomainError> {
        let db = self.store.lock()?;
        Ok(db.users.values().find(|u| u.email() == email).cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut db = self.store.lock()?;

        if db.users.values().any(|u| u.username() == user.username()) {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                user.username()
            )));
        }

        if db.users.values().any(|u| u.email() == user.email()) {
            return Err(DomainError::conflict(format!(
                "Email '{}' already exists",
                user.email()
            )));
        }

        db.users.insert(*user.id(), user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut db = self.store.lock()?;

        if !db.users.contains_key(user.id()) {
            return Err(DomainError::not_found(format!(
                "User '{}' not found",
                user.id()
            )));
        }

        db.users.insert(*user.id(), user.clone());
        Ok(user.clone())
    }

    async fn record_login(&self, id: &UserId) -> Result<(), DomainError> {
        let mut db = self.store.lock()?;

        let user = db
            .users
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        user.record_login(Utc::now());
        Ok(())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let db = self.store.lock()?;
        Ok(db.users.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> MemoryUserRepository {
        MemoryUserRepository::new(MemoryStore::new())
    }

    fn make_user(username: &str, email: &str) -> User {
        User::new(username, Email::parse(email).unwrap(), "Test User", "hash")
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = repo();
        let user = make_user("alice", "alice@x.com");
        let id = *user.id();

        repo.create(user).await.unwrap();

        let fetched = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.username(), "alice");
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let repo = repo();

        repo.create(make_user("alice", "alice@x.com")).await.unwrap();
        let result = repo.create(make_user("alice", "other@x.com")).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = repo();

        repo.create(make_user("alice", "alice@x.com")).await.unwrap();
        let result = repo.create(make_user("alice2", "alice@x.com")).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_get_by_email_is_normalized() {
        let repo = repo();
        repo.create(make_user("alice", "Alice@X.com")).await.unwrap();

        let found = repo
            .get_by_email(&Email::parse("alice@x.com").unwrap())
            .await
            .unwrap();

        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_record_login() {
        let repo = repo();
        let user = make_user("alice", "alice@x.com");
        let id = *user.id();

        repo.create(user).await.unwrap();
        repo.record_login(&id).await.unwrap();

        let fetched = repo.get(&id).await.unwrap().unwrap();
        assert!(fetched.last_login_at().is_some());
    }

    #[tokio::test]
    async fn test_count() {
        let repo = repo();
        assert_eq!(repo.count().await.unwrap(), 0);

        repo.create(make_user("alice", "alice@x.com")).await.unwrap();
        repo.create(make_user("bob", "bob@x.com")).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
