//! Normalized email addresses
//!
//! Every email entering the system is trimmed and lower-cased before any
//! comparison or storage. Identity binding between an invitation and the
//! accepting account relies on this normalization happening in exactly one
//! place.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidateEmail;

/// Errors from email parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("Email address cannot be empty")]
    Empty,
    #[error("Invalid email address")]
    Invalid,
}

/// A syntactically valid, normalized (trimmed, lower-cased) email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Parse and normalize a raw email address
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, EmailError> {
        let normalized = raw.as_ref().trim().to_lowercase();

        if normalized.is_empty() {
            return Err(EmailError::Empty);
        }

        if !normalized.validate_email() {
            return Err(EmailError::Invalid);
        }

        Ok(Self(normalized))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case- and whitespace-insensitive comparison against a raw address
    pub fn matches(&self, raw: &str) -> bool {
        self.0 == raw.trim().to_lowercase()
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let email = Email::parse("bob@x.com").unwrap();
        assert_eq!(email.as_str(), "bob@x.com");
    }

    #[test]
    fn test_parse_normalizes() {
        let email = Email::parse("  Bob@X.COM  ").unwrap();
        assert_eq!(email.as_str(), "bob@x.com");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Email::parse("not-an-email"), Err(EmailError::Invalid));
        assert_eq!(Email::parse("missing@domain@x"), Err(EmailError::Invalid));
    }

    #[test]
    fn test_matches_is_case_and_whitespace_insensitive() {
        let email = Email::parse("bob@x.com").unwrap();

        assert!(email.matches("bob@x.com"));
        assert!(email.matches("  BOB@x.Com "));
        assert!(!email.matches("carol@x.com"));
    }

    #[test]
    fn test_equal_after_normalization() {
        let a = Email::parse("Bob@X.com").unwrap();
        let b = Email::parse("bob@x.com ").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serde_round_trip() {
        let email = Email::parse("bob@x.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"bob@x.com\"");

        let back: Email = serde_json::from_str(&json).unwrap();
        assert_eq!(back, email);
    }
}
