//! Authentication and abuse-mitigation core for the vitrine CMS admin.
//!
//! Covers the security-relevant part of the admin path:
//!
//! - session lifecycle with fingerprint binding and idle expiry ([`session`], [`actions`])
//! - per-address brute-force throttling ([`rate_limit`])
//! - session-bound anti-forgery tokens ([`csrf`])
//! - Argon2id password hashing ([`crypto`])
//!
//! Content persistence, routing and templates live outside this crate and
//! talk to it through the repository traits in [`repository`] and the
//! guards in [`actions`] / [`csrf`].

pub mod actions;
pub mod client;
pub mod config;
pub mod crypto;
pub mod csrf;
pub mod events;
pub mod rate_limit;
pub mod repository;
pub mod secret;
pub mod session;
pub mod validators;

#[cfg(feature = "axum_api")]
pub mod api;

#[cfg(feature = "sqlx_sqlite")]
pub mod sqlite;

use std::fmt;

pub use client::ClientInfo;
pub use config::AuthConfig;
pub use events::register_event_listeners;
pub use repository::{
    Credential, CredentialRepository, FailedAttempt, FailedAttemptRepository, Role,
};
#[cfg(any(test, feature = "mocks"))]
pub use repository::{MockCredentialRepository, MockFailedAttemptRepository};
pub use secret::SecretString;

/// Generic message shown for every login rejection.
///
/// Unknown user, wrong password and lockout all collapse to this text so the
/// response never tells an attacker which one happened.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials.";

#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Unknown username or wrong password.
    InvalidCredentials,
    /// The client address hit the hard limit of failed attempts.
    TooManyAttempts,
    /// No valid session (missing, expired, or fingerprint mismatch).
    Unauthenticated,
    /// Missing or mismatched anti-forgery token.
    CsrfRejected,
    /// Client address is not a valid IPv4/IPv6 address.
    InvalidAddress,
    /// The bootstrap step found an existing credential.
    AdminAlreadyExists,
    Validation(String),
    PasswordHashError,
    DatabaseError(String),
    ConfigurationError(String),
}

impl AuthError {
    /// Text that may be shown to the end user.
    ///
    /// Internal details never leave through this method; they are only
    /// available through `Display` for logging.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials | Self::TooManyAttempts => INVALID_CREDENTIALS_MESSAGE,
            Self::Unauthenticated => "Please log in.",
            Self::CsrfRejected => "Invalid CSRF token. Request rejected.",
            Self::AdminAlreadyExists => "An administrator already exists.",
            Self::Validation(_) => "The submitted data is invalid.",
            Self::InvalidAddress
            | Self::PasswordHashError
            | Self::DatabaseError(_)
            | Self::ConfigurationError(_) => "Something went wrong. Please try again later.",
        }
    }

    /// Returns true for rejections that come from the login gate itself.
    pub fn is_credential_rejection(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::TooManyAttempts)
    }
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "Invalid username or password"),
            Self::TooManyAttempts => write!(f, "Too many failed login attempts"),
            Self::Unauthenticated => write!(f, "Not authenticated"),
            Self::CsrfRejected => write!(f, "CSRF token missing or invalid"),
            Self::InvalidAddress => write!(f, "Invalid client address"),
            Self::AdminAlreadyExists => write!(f, "Administrator already exists"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::PasswordHashError => write!(f, "Failed to hash password"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lockout_and_bad_password_read_the_same() {
        assert_eq!(
            AuthError::TooManyAttempts.public_message(),
            AuthError::InvalidCredentials.public_message()
        );
    }

    #[test]
    fn test_backend_errors_hide_details() {
        let err = AuthError::DatabaseError("connection refused at 10.0.0.3".to_owned());
        assert!(!err.public_message().contains("10.0.0.3"));
        assert!(err.to_string().contains("10.0.0.3"));
    }

    #[test]
    fn test_credential_rejection() {
        assert!(AuthError::InvalidCredentials.is_credential_rejection());
        assert!(AuthError::TooManyAttempts.is_credential_rejection());
        assert!(!AuthError::CsrfRejected.is_credential_rejection());
    }
}
