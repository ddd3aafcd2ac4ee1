//! JWT access/refresh token issuance and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::user::User;
use crate::domain::DomainError;

const TOKEN_TYPE_ACCESS: &str = "access";
const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Normalized email of the subject
    pub email: String,
    /// "access" or "refresh"
    pub token_type: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl JwtClaims {
    fn new(user: &User, token_type: &str, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user.id().to_string(),
            email: user.email().as_str().to_string(),
            token_type: token_type.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Get the user ID from claims
    pub fn user_id(&self) -> &str {
        &self.sub
    }
}

/// An access/refresh token pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Configuration for the JWT service
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Access token lifetime in hours
    pub access_expiration_hours: u64,
    /// Refresh token lifetime in hours
    pub refresh_expiration_hours: u64,
}

impl JwtConfig {
    pub fn new(
        secret: impl Into<String>,
        access_expiration_hours: u64,
        refresh_expiration_hours: u64,
    ) -> Self {
        Self {
            secret: secret.into(),
            access_expiration_hours,
            refresh_expiration_hours,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_expiration_hours: 24,
            refresh_expiration_hours: 24 * 7,
        }
    }
}

/// Trait for token operations
pub trait TokenIssuer: Send + Sync + Debug {
    /// Issue an access/refresh pair for a user
    fn issue_pair(&self, user: &User) -> Result<TokenPair, DomainError>;

    /// Validate an access token and return the claims
    fn validate_access(&self, token: &str) -> Result<JwtClaims, DomainError>;

    /// Validate a refresh token and return the claims. An access token is
    /// not accepted here.
    fn validate_refresh(&self, token: &str) -> Result<JwtClaims, DomainError>;

    /// Access token lifetime in hours
    fn access_expiration_hours(&self) -> u64;
}

/// HS256 JWT service
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_expiration_hours", &self.config.access_expiration_hours)
            .field("refresh_expiration_hours", &self.config.refresh_expiration_hours)
            .field("secret", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn issue(&self, user: &User, token_type: &str, hours: u64) -> Result<String, DomainError> {
        let claims = JwtClaims::new(user, token_type, Duration::hours(hours as i64));

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to generate JWT: {}", e)))
    }

    fn validate(&self, token: &str, expected_type: &str) -> Result<JwtClaims, DomainError> {
        let validation = Validation::default();

        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| DomainError::credential(format!("Invalid token: {}", e)))?;

        if token_data.claims.token_type != expected_type {
            return Err(DomainError::credential(format!(
                "Expected {} token",
                expected_type
            )));
        }

        Ok(token_data.claims)
    }
}

impl TokenIssuer for JwtService {
    fn issue_pair(&self, user: &User) -> Result<TokenPair, DomainError> {
        Ok(TokenPair {
            access: self.issue(user, TOKEN_TYPE_ACCESS, self.config.access_expiration_hours)?,
            refresh: self.issue(
                user,
                TOKEN_TYPE_REFRESH,
                self.config.refresh_expiration_hours,
            )?,
        })
    }

    fn validate_access(&self, token: &str) -> Result<JwtClaims, DomainError> {
        self.validate(token, TOKEN_TYPE_ACCESS)
    }

    fn validate_refresh(&self, token: &str) -> Result<JwtClaims, DomainError> {
        self.validate(token, TOKEN_TYPE_REFRESH)
    }

    fn access_expiration_hours(&self) -> u64 {
        self.config.access_expiration_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Email;

    fn create_test_user() -> User {
        User::new(
            "alice",
            Email::parse("alice@x.com").unwrap(),
            "Alice Example",
            "hashed_password",
        )
    }

    fn create_service() -> JwtService {
        JwtService::new(JwtConfig::new("test-secret-key-12345", 24, 168))
    }

    #[test]
    fn test_issue_and_validate_pair() {
        let service = create_service();
        let user = create_test_user();

        let pair = service.issue_pair(&user).unwrap();

        let access = service.validate_access(&pair.access).unwrap();
        assert_eq!(access.sub, user.id().to_string());
        assert_eq!(access.email, "alice@x.com");

        let refresh = service.validate_refresh(&pair.refresh).unwrap();
        assert_eq!(refresh.sub, user.id().to_string());
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let service = create_service();
        let pair = service.issue_pair(&create_test_user()).unwrap();

        assert!(service.validate_access(&pair.refresh).is_err());
        assert!(service.validate_refresh(&pair.access).is_err());
    }

    #[test]
    fn test_invalid_token() {
        let service = create_service();
        assert!(service.validate_access("garbage").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let service1 = JwtService::new(JwtConfig::new("secret-1", 24, 168));
        let service2 = JwtService::new(JwtConfig::new("secret-2", 24, 168));

        let pair = service1.issue_pair(&create_test_user()).unwrap();

        assert!(service2.validate_access(&pair.access).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = create_service();
        let user = create_test_user();

        let past = Utc::now() - Duration::hours(2);
        let claims = JwtClaims {
            sub: user.id().to_string(),
            email: user.email().as_str().to_string(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
            iat: (past - Duration::hours(1)).timestamp(),
            exp: past.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key-12345"),
        )
        .unwrap();

        assert!(service.validate_access(&token).is_err());
    }

    #[test]
    fn test_access_expiration_hours() {
        let service = JwtService::new(JwtConfig::new("secret", 48, 168));
        assert_eq!(service.access_expiration_hours(), 48);
    }

    #[test]
    fn test_default_config() {
        let config = JwtConfig::default();
        assert_eq!(config.access_expiration_hours, 24);
        assert_eq!(config.refresh_expiration_hours, 168);
    }
}
