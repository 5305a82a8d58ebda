use serde::{Deserialize, Serialize};

use super::ValidationError;
use crate::crypto::constant_time_eq;

/// Password rules for new credentials.
///
/// Lengths count characters, not bytes.
///
/// ```
/// use vitrine::validators::PasswordPolicy;
///
/// let policy = PasswordPolicy::default();
/// assert!(policy.validate("correct horse").is_ok());
/// assert!(policy.validate("short").is_err());
///
/// let policy = PasswordPolicy::new().min(12);
/// assert!(policy.validate("elevenchars").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Default: 8
    pub min_length: usize,
    /// Default: 128
    pub max_length: usize,
    /// Rejected regardless of case.
    #[serde(default)]
    pub disallowed_passwords: Vec<String>,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            disallowed_passwords: Vec::new(),
        }
    }
}

impl PasswordPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn min(mut self, len: usize) -> Self {
        self.min_length = len;
        self
    }

    #[must_use]
    pub fn max(mut self, len: usize) -> Self {
        self.max_length = len;
        self
    }

    #[must_use]
    pub fn disallowed_passwords(mut self, passwords: Vec<String>) -> Self {
        self.disallowed_passwords = passwords;
        self
    }

    /// # Errors
    ///
    /// Returns the first rule the password breaks.
    pub fn validate(&self, password: &str) -> Result<(), ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::PasswordEmpty);
        }

        let length = password.chars().count();
        if length < self.min_length {
            return Err(ValidationError::PasswordTooShort(self.min_length));
        }
        if length > self.max_length {
            return Err(ValidationError::PasswordTooLong(self.max_length));
        }

        if self
            .disallowed_passwords
            .iter()
            .any(|p| p.eq_ignore_ascii_case(password))
        {
            return Err(ValidationError::PasswordCommon);
        }

        Ok(())
    }
}

/// Validates against [`PasswordPolicy::default`].
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    PasswordPolicy::default().validate(password)
}

pub fn validate_password_confirmation(
    password: &str,
    confirmation: &str,
) -> Result<(), ValidationError> {
    if constant_time_eq(password.as_bytes(), confirmation.as_bytes()) {
        Ok(())
    } else {
        Err(ValidationError::PasswordMismatch)
    }
}
