//! Validation rules for user fields

use thiserror::Error;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 150;
const PASSWORD_MIN: usize = 5;
const FULL_NAME_MAX: usize = 255;

/// Validation errors for user fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    #[error("Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters")]
    UsernameLength,
    #[error("Username may only contain letters, digits, '.', '-' and '_'")]
    UsernameCharacters,
    #[error("Password must be at least {PASSWORD_MIN} characters")]
    PasswordTooShort,
    #[error("Full name must be at most {FULL_NAME_MAX} characters")]
    FullNameTooLong,
}

/// Validate a username
pub fn validate_username(username: &str) -> Result<(), UserValidationError> {
    let len = username.chars().count();

    if len < USERNAME_MIN || len > USERNAME_MAX {
        return Err(UserValidationError::UsernameLength);
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return Err(UserValidationError::UsernameCharacters);
    }

    Ok(())
}

/// Validate a plain-text password before hashing
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(UserValidationError::PasswordTooShort);
    }

    Ok(())
}

/// Validate a full name
pub fn validate_full_name(full_name: &str) -> Result<(), UserValidationError> {
    if full_name.chars().count() > FULL_NAME_MAX {
        return Err(UserValidationError::FullNameTooLong);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob_42").is_ok());
        assert!(validate_username("carol.smith-jones").is_ok());
    }

    #[test]
    fn test_username_too_short() {
        assert_eq!(
            validate_username("ab"),
            Err(UserValidationError::UsernameLength)
        );
    }

    #[test]
    fn test_username_too_long() {
        let long = "a".repeat(151);
        assert_eq!(
            validate_username(&long),
            Err(UserValidationError::UsernameLength)
        );
    }

    #[test]
    fn test_username_bad_characters() {
        assert_eq!(
            validate_username("alice smith"),
            Err(UserValidationError::UsernameCharacters)
        );
        assert_eq!(
            validate_username("alice@host"),
            Err(UserValidationError::UsernameCharacters)
        );
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("12345").is_ok());
        assert_eq!(
            validate_password("1234"),
            Err(UserValidationError::PasswordTooShort)
        );
    }

    #[test]
    fn test_full_name() {
        assert!(validate_full_name("Alice Example").is_ok());
        assert!(validate_full_name("").is_ok());
        assert_eq!(
            validate_full_name(&"x".repeat(256)),
            Err(UserValidationError::FullNameTooLong)
        );
    }
}
