//! Input checks for the bootstrap step.
//!
//! Login itself never validates input shape: any username/password pair is
//! simply looked up and verified, so a malformed value is reported as an
//! ordinary credential failure.

pub mod password;
pub mod username;

pub use password::{PasswordPolicy, validate_password, validate_password_confirmation};
pub use username::validate_username;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationError {
    UsernameEmpty,
    UsernameTooLong(usize),
    UsernameInvalidCharacters,
    PasswordEmpty,
    PasswordTooShort(usize),
    PasswordTooLong(usize),
    PasswordMismatch,
    PasswordCommon,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UsernameEmpty => write!(f, "Username cannot be empty"),
            Self::UsernameTooLong(max) => write!(f, "Username is too long (max {max} characters)"),
            Self::UsernameInvalidCharacters => write!(
                f,
                "Username may only contain letters, digits and . _ @ -"
            ),
            Self::PasswordEmpty => write!(f, "Password cannot be empty"),
            Self::PasswordTooShort(min) => {
                write!(f, "Password must be at least {min} characters")
            }
            Self::PasswordTooLong(max) => write!(f, "Password is too long (max {max} characters)"),
            Self::PasswordMismatch => write!(f, "Passwords do not match"),
            Self::PasswordCommon => write!(f, "Password is too common"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for crate::AuthError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
