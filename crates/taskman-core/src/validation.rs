//! Input validation

use crate::error::ServiceError;

/// Minimum allowed username length
const MIN_USERNAME_LENGTH: usize = 3;
/// Maximum allowed username length
const MAX_USERNAME_LENGTH: usize = 64;
/// Minimum allowed password length
const MIN_PASSWORD_LENGTH: usize = 6;
/// Maximum allowed password length (prevent DoS with very large passwords)
pub const MAX_PASSWORD_LENGTH: usize = 256;
/// Maximum allowed email length
const MAX_EMAIL_LENGTH: usize = 254;
/// Maximum allowed full name length
const MAX_FULL_NAME_LENGTH: usize = 128;
/// Maximum allowed todo/subtask title length
const MAX_TITLE_LENGTH: usize = 200;
/// Maximum allowed todo description length
const MAX_DESCRIPTION_LENGTH: usize = 4000;

/// Validate username format and length
pub fn validate_username(username: &str) -> Result<(), ServiceError> {
    if username.len() < MIN_USERNAME_LENGTH {
        return Err(ServiceError::Validation(format!(
            "Username must be at least {} characters long",
            MIN_USERNAME_LENGTH
        )));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ServiceError::Validation(format!(
            "Username exceeds maximum length of {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    // Only allow alphanumeric characters, underscores, and hyphens
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ServiceError::Validation(
            "Username can only contain alphanumeric characters, underscores, and hyphens"
                .to_string(),
        ));
    }
    Ok(())
}

/// Validate the shape of an email address
pub fn validate_email(email: &str) -> Result<(), ServiceError> {
    let invalid = || ServiceError::Validation("Invalid email address".to_string());

    if email.len() > MAX_EMAIL_LENGTH || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.split_once('.') {
        Some((head, _)) if !head.is_empty() && !domain.ends_with('.') => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::Validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ServiceError::Validation(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub fn validate_full_name(full_name: &str) -> Result<(), ServiceError> {
    if full_name.chars().count() > MAX_FULL_NAME_LENGTH {
        return Err(ServiceError::Validation(format!(
            "Full name exceeds maximum length of {} characters",
            MAX_FULL_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Validate a todo or subtask title
pub fn validate_title(title: &str) -> Result<(), ServiceError> {
    if title.trim().is_empty() {
        return Err(ServiceError::Validation("Title cannot be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ServiceError::Validation(format!(
            "Title exceeds maximum length of {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ServiceError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ServiceError::Validation(format!(
            "Description exceeds maximum length of {} characters",
            MAX_DESCRIPTION_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("john_doe-2").is_ok());
        assert!(validate_username("al").is_err());
        assert!(validate_username("alice smith").is_err());
        assert!(validate_username("admin' --").is_err());
        assert!(validate_username(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("alice@x.com").is_ok());
        assert!(validate_email("a.b+tag@mail.example.org").is_ok());
        assert!(validate_email("alice").is_err());
        assert!(validate_email("@x.com").is_err());
        assert!(validate_email("alice@localhost").is_err());
        assert!(validate_email("alice@x.").is_err());
        assert!(validate_email("alice@.com").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("al ice@x.com").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"p".repeat(257)).is_err());
    }

    #[test]
    fn test_title_rules() {
        assert!(validate_title("Buy groceries").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"t".repeat(201)).is_err());
    }
}
