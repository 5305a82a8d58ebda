use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::{AuthError, Role, SecretString};

/// Name of the honeypot field on the login form. Real users never fill it.
pub const HONEYPOT_FIELD: &str = "email2";

// Request DTOs

/// Login form body (`application/x-www-form-urlencoded`).
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: SecretString,
    pub csrf_token: Option<String>,
    /// Honeypot.
    pub email2: Option<String>,
}

impl LoginForm {
    pub fn is_bot(&self) -> bool {
        self.email2.as_deref().is_some_and(|v| !v.trim().is_empty())
    }
}

/// Body of any state-changing admin form that carries only the token.
#[derive(Debug, Default, Deserialize)]
pub struct CsrfForm {
    pub csrf_token: Option<String>,
}

// Response DTOs

#[derive(Debug, Serialize)]
pub struct LoginPageResponse {
    pub field_name: String,
    pub csrf_token: String,
    pub honeypot_field: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub last_activity: DateTime<Utc>,
    pub csrf_token: String,
}

impl SessionResponse {
    pub fn new(session: &Session, csrf_token: String) -> Self {
        Self {
            user_id: session.data.user_id,
            username: session.data.username.clone(),
            role: session.data.role,
            last_activity: session.data.last_activity,
            csrf_token,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        Self {
            error: err.public_message().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_hides_detail() {
        let response = ErrorResponse::from(AuthError::DatabaseError("connection refused".into()));
        assert!(!response.error.contains("connection"));
    }

    #[test]
    fn test_lockout_and_bad_password_identical() {
        assert_eq!(
            ErrorResponse::from(AuthError::TooManyAttempts).error,
            ErrorResponse::from(AuthError::InvalidCredentials).error
        );
    }

    #[test]
    fn test_honeypot_detection() {
        let mut form = LoginForm {
            username: "admin".into(),
            password: SecretString::new("x"),
            csrf_token: None,
            email2: None,
        };
        assert!(!form.is_bot());
        form.email2 = Some("  ".into());
        assert!(!form.is_bot());
        form.email2 = Some("bot@example.com".into());
        assert!(form.is_bot());
    }
}
