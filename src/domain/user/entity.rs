//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Email;

/// User identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from a string representation
    pub fn parse(value: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(value)?))
    }

    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    email: Email,
    full_name: String,
    #[serde(skip_serializing)]
    password_hash: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new active user
    pub fn new(
        username: impl Into<String>,
        email: Email,
        full_name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            email,
            full_name: full_name.into(),
            password_hash: password_hash.into(),
            is_active: true,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    /// Rehydrate a user from storage
    #[allow(clippy::too_many_arguments)]
    pub fn from_storage(
        id: UserId,
        username: String,
        email: Email,
        full_name: String,
        password_hash: String,
        is_active: bool,
        created_at: DateTime<Utc>,
        last_login_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            username,
            email,
            full_name,
            password_hash,
            is_active,
            created_at,
            last_login_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    /// Record a successful login
    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login_at = Some(at);
    }

    /// Suspend the account
    pub fn suspend(&mut self) {
        self.is_active = false;
    }

    /// Reactivate a suspended account
    pub fn activate(&mut self) {
        self.is_active = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new(
            "alice",
            Email::parse("alice@x.com").unwrap(),
            "Alice Example",
            "argon2-hash",
        )
    }

    #[test]
    fn test_new_user_is_active() {
        let user = test_user();

        assert!(user.is_active());
        assert_eq!(user.username(), "alice");
        assert_eq!(user.email().as_str(), "alice@x.com");
        assert!(user.last_login_at().is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(test_user().id(), test_user().id());
    }

    #[test]
    fn test_suspend_and_activate() {
        let mut user = test_user();

        user.suspend();
        assert!(!user.is_active());

        user.activate();
        assert!(user.is_active());
    }

    #[test]
    fn test_record_login() {
        let mut user = test_user();
        let now = Utc::now();

        user.record_login(now);
        assert_eq!(user.last_login_at(), Some(now));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = test_user();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2-hash"));
    }

    #[test]
    fn test_user_id_parse_round_trip() {
        let id = UserId::new();
        let parsed = UserId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_user_id_parse_invalid() {
        assert!(UserId::parse("not-a-uuid").is_err());
    }
}
