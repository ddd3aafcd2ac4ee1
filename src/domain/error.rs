use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    #[error("Credential error: {message}")]
    Credential { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Already a member: {message}")]
    AlreadyMember { message: String },

    #[error("Already processed: {message}")]
    AlreadyProcessed { message: String },

    #[error("Expired: {message}")]
    Expired { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn already_member(message: impl Into<String>) -> Self {
        Self::AlreadyMember {
            message: message.into(),
        }
    }

    pub fn already_processed(message: impl Into<String>) -> Self {
        Self::AlreadyProcessed {
            message: message.into(),
        }
    }

    pub fn expired(message: impl Into<String>) -> Self {
        Self::Expired {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Workspace 'acme' not found");
        assert_eq!(error.to_string(), "Not found: Workspace 'acme' not found");
    }

    #[test]
    fn test_conflict_error() {
        let error = DomainError::conflict("Slug already taken");
        assert_eq!(error.to_string(), "Conflict: Slug already taken");
    }

    #[test]
    fn test_expired_error() {
        let error = DomainError::expired("Invitation has expired");
        assert_eq!(error.to_string(), "Expired: Invitation has expired");
    }

    #[test]
    fn test_forbidden_error() {
        let error = DomainError::forbidden("Invitation was sent to a different email");
        assert!(error.to_string().starts_with("Forbidden:"));
    }
}
