//! User validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("name is too long (maximum {0} characters)")]
    NameTooLong(usize),

    #[error("invalid email format")]
    InvalidEmail,

    #[error("email is too long (maximum {0} characters)")]
    EmailTooLong(usize),
}

pub const MIN_NAME_LENGTH: usize = 1;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MIN_EMAIL_LENGTH: usize = 5;
pub const MAX_EMAIL_LENGTH: usize = 254;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// Validate a user's display name
///
/// Lengths are measured in bytes of the raw input; nothing is trimmed.
pub fn validate_name(name: &str) -> Result<(), UserValidationError> {
    if name.len() < MIN_NAME_LENGTH {
        return Err(UserValidationError::EmptyName);
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(UserValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}

/// Validate an email address
///
/// Rules:
/// - At least 5 characters, at most 254
/// - `local@domain.tld` with a purely alphabetic TLD of 2+ characters
/// - Case is preserved and compared exactly
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.len() < MIN_EMAIL_LENGTH {
        return Err(UserValidationError::InvalidEmail);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(UserValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(UserValidationError::InvalidEmail);
    }

    Ok(())
}

/// Validate a candidate record; the first violated rule wins, name first.
pub fn validate_user(name: &str, email: &str) -> Result<(), UserValidationError> {
    validate_name(name)?;
    validate_email(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_name("J").is_ok());
        assert!(validate_name("John Doe").is_ok());
        assert!(validate_name(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(validate_name(""), Err(UserValidationError::EmptyName));
    }

    #[test]
    fn test_whitespace_name_is_not_trimmed() {
        assert!(validate_name(" ").is_ok());
    }

    #[test]
    fn test_name_too_long() {
        assert_eq!(
            validate_name(&"a".repeat(101)),
            Err(UserValidationError::NameTooLong(100))
        );
    }

    #[test]
    fn test_name_length_counts_bytes() {
        // 51 characters, 102 bytes
        assert_eq!(
            validate_name(&"é".repeat(51)),
            Err(UserValidationError::NameTooLong(100))
        );
        assert!(validate_name(&"é".repeat(50)).is_ok());
    }

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("john@example.com").is_ok());
        assert!(validate_email("a.b+tag@sub.example.org").is_ok());
        assert!(validate_email("x_y%z-1@host-name.io").is_ok());
        assert!(validate_email("UPPER@EXAMPLE.COM").is_ok());
    }

    #[test]
    fn test_email_too_short() {
        assert_eq!(validate_email("a@b."), Err(UserValidationError::InvalidEmail));
        assert_eq!(validate_email(""), Err(UserValidationError::InvalidEmail));
    }

    #[test]
    fn test_email_too_long() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert_eq!(
            validate_email(&email),
            Err(UserValidationError::EmailTooLong(254))
        );
    }

    #[test]
    fn test_email_at_max_length() {
        let email = format!("{}@example.com", "a".repeat(254 - "@example.com".len()));
        assert_eq!(email.len(), 254);
        assert!(validate_email(&email).is_ok());
    }

    #[test]
    fn test_malformed_emails() {
        for email in [
            "plainaddress",
            "missing-at.example.com",
            "user@nodot",
            "user@example.c",
            "user@example.c0m",
            "us er@example.com",
            "@example.com",
            "user@@example.com",
            " john@example.com",
            "john@example.com ",
        ] {
            assert_eq!(
                validate_email(email),
                Err(UserValidationError::InvalidEmail),
                "expected {email:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_name_checked_before_email() {
        assert_eq!(
            validate_user("", "not-an-email"),
            Err(UserValidationError::EmptyName)
        );
        assert_eq!(
            validate_user("John", "not-an-email"),
            Err(UserValidationError::InvalidEmail)
        );
        assert!(validate_user("John", "john@example.com").is_ok());
    }
}
