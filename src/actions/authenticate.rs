use chrono::{Duration, Utc};

use crate::AuthError;
use crate::events::{AuthEvent, dispatch};
use crate::session::{Session, SessionRepository, TouchOutcome};

/// Session validation for protected admin requests.
pub struct AuthenticateAction<S: SessionRepository> {
    sessions: S,
    idle_timeout: Duration,
}

impl<S: SessionRepository> AuthenticateAction<S> {
    pub fn new(sessions: S, idle_timeout: Duration) -> Self {
        Self {
            sessions,
            idle_timeout,
        }
    }

    /// True when the session exists, was created for this fingerprint and
    /// has been active within the idle timeout. Refreshes the activity time
    /// on success and destroys the session on a fingerprint or timeout
    /// failure. Storage errors count as unauthenticated.
    pub async fn is_authenticated(&self, session_id: Option<&str>, fingerprint: &str) -> bool {
        self.require_authenticated(session_id, fingerprint)
            .await
            .is_ok()
    }

    /// Guard for protected handlers.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` for a missing, expired or hijacked session, without
    /// saying which. Storage errors propagate unchanged.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "require_authenticated", skip_all, err)
    )]
    pub async fn require_authenticated(
        &self,
        session_id: Option<&str>,
        fingerprint: &str,
    ) -> Result<Session, AuthError> {
        let Some(session_id) = session_id else {
            return Err(AuthError::Unauthenticated);
        };

        let outcome = self
            .sessions
            .touch(session_id, fingerprint, self.idle_timeout)
            .await
            .map_err(|e| {
                log::error!(target: "vitrine_auth::session", "msg=\"session lookup failed\" error=\"{e}\"");
                e
            })?;

        match outcome {
            TouchOutcome::Active(session) => Ok(session),
            TouchOutcome::Missing => Err(AuthError::Unauthenticated),
            rejected @ (TouchOutcome::FingerprintMismatch | TouchOutcome::Expired) => {
                log::warn!(
                    target: "vitrine_auth::session",
                    "msg=\"session invalidated\" reason={}",
                    rejected.reason()
                );
                dispatch(AuthEvent::SessionInvalidated {
                    reason: rejected.reason().to_owned(),
                    at: Utc::now(),
                })
                .await;
                Err(AuthError::Unauthenticated)
            }
        }
    }

    /// [`Self::require_authenticated`] plus the administrator role check.
    pub async fn require_admin(
        &self,
        session_id: Option<&str>,
        fingerprint: &str,
    ) -> Result<Session, AuthError> {
        let session = self.require_authenticated(session_id, fingerprint).await?;
        if session.data.is_admin() {
            Ok(session)
        } else {
            log::warn!(
                target: "vitrine_auth::session",
                "msg=\"admin role required\" user_id={}",
                session.data.user_id
            );
            Err(AuthError::Unauthenticated)
        }
    }
}
