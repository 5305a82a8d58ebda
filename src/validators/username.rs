use std::sync::LazyLock;

use regex::Regex;

use super::ValidationError;

pub const MAX_USERNAME_LENGTH: usize = 50;

#[allow(clippy::expect_used)]
static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._@-]+$").expect("static pattern compiles"));

/// Validates an administrator username, expected already trimmed.
///
/// ```
/// use vitrine::validators::validate_username;
///
/// assert!(validate_username("admin").is_ok());
/// assert!(validate_username("").is_err());
/// assert!(validate_username("bad name").is_err());
/// ```
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::UsernameEmpty);
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooLong(MAX_USERNAME_LENGTH));
    }
    if !USERNAME_PATTERN.is_match(username) {
        return Err(ValidationError::UsernameInvalidCharacters);
    }
    Ok(())
}
