use chrono::Utc;

use crate::AuthError;
use crate::config::CsrfConfig;
use crate::crypto::{constant_time_eq, generate_hex_token};
use crate::events::{AuthEvent, dispatch};
use crate::session::SessionRepository;

/// Session-bound CSRF tokens over a [`SessionRepository`].
pub struct CsrfProtection<S: SessionRepository> {
    sessions: S,
    config: CsrfConfig,
}

impl<S: SessionRepository> CsrfProtection<S> {
    pub fn new(sessions: S, config: CsrfConfig) -> Self {
        Self { sessions, config }
    }

    pub fn field_name(&self) -> &str {
        &self.config.field_name
    }

    /// Creates a fresh token for the session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` if the session does not exist.
    pub async fn generate_token(&self, session_id: &str) -> Result<String, AuthError> {
        let token = generate_hex_token(self.config.token_bytes);
        if self.sessions.set_csrf_token(session_id, &token).await? {
            Ok(token)
        } else {
            Err(AuthError::Unauthenticated)
        }
    }

    /// Returns the bound token without creating one.
    pub async fn get_token(&self, session_id: &str) -> Result<Option<String>, AuthError> {
        Ok(self
            .sessions
            .load(session_id)
            .await?
            .and_then(|s| s.data.csrf_token))
    }

    pub async fn get_or_create_token(&self, session_id: &str) -> Result<String, AuthError> {
        match self.get_token(session_id).await? {
            Some(token) => Ok(token),
            None => self.generate_token(session_id).await,
        }
    }

    /// True only if a token is bound, one was supplied, and they match.
    ///
    /// A storage failure counts as a mismatch.
    pub async fn validate_token(&self, session_id: &str, supplied: Option<&str>) -> bool {
        let Some(supplied) = supplied.filter(|s| !s.is_empty()) else {
            return false;
        };

        match self.get_token(session_id).await {
            Ok(Some(bound)) => constant_time_eq(bound.as_bytes(), supplied.as_bytes()),
            Ok(None) => false,
            Err(e) => {
                log::error!(target: "vitrine_auth::csrf", "msg=\"csrf token lookup failed\" error=\"{e}\"");
                false
            }
        }
    }

    /// Guard for state-changing handlers; call before any mutation.
    ///
    /// # Errors
    ///
    /// `CsrfRejected` on any validation failure.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "require_valid_csrf_token", skip_all, err)
    )]
    pub async fn require_valid_token(
        &self,
        session_id: &str,
        supplied: Option<&str>,
    ) -> Result<(), AuthError> {
        if self.validate_token(session_id, supplied).await {
            return Ok(());
        }

        log::warn!(
            target: "vitrine_auth::csrf",
            "msg=\"csrf token rejected\" supplied={}",
            supplied.is_some()
        );
        dispatch(AuthEvent::CsrfRejected { at: Utc::now() }).await;
        Err(AuthError::CsrfRejected)
    }

    /// Hidden form input carrying the session's token, creating it if needed.
    pub async fn hidden_field(&self, session_id: &str) -> Result<String, AuthError> {
        let token = self.get_or_create_token(session_id).await?;
        Ok(token_field(&self.config.field_name, &token))
    }
}

/// Renders `<input type="hidden" name="{field}" value="{token}">` with both
/// attribute values HTML-escaped.
pub fn token_field(field_name: &str, token: &str) -> String {
    format!(
        r#"<input type="hidden" name="{}" value="{}">"#,
        escape_attribute(field_name),
        escape_attribute(token)
    )
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}
