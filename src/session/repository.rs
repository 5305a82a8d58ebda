//! Session repository trait.

use async_trait::async_trait;
use chrono::Duration;

use crate::AuthError;

use super::{Session, SessionData, TouchOutcome};

/// Server-side session storage.
///
/// Implementations provide different storage backends:
/// - [`InMemorySessionRepository`](super::InMemorySessionRepository): single-process storage
/// - [`FileSessionRepository`](super::FileSessionRepository): JSON file per session
///
/// `touch` must be atomic per session id: two concurrent requests for the
/// same id never observe a half-applied refresh or destroy.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Stores `data` under a newly generated id and returns that id.
    async fn create(&self, data: SessionData) -> Result<String, AuthError>;

    async fn load(&self, session_id: &str) -> Result<Option<Session>, AuthError>;

    /// Replaces the data of an existing session. Unknown ids are ignored.
    async fn save(&self, session_id: &str, data: SessionData) -> Result<(), AuthError>;

    /// Removes a session. Removing an unknown id is not an error.
    async fn destroy(&self, session_id: &str) -> Result<(), AuthError>;

    /// Checks the fingerprint and idle timeout, then either refreshes
    /// `last_activity` or destroys the session.
    async fn touch(
        &self,
        session_id: &str,
        fingerprint: &str,
        idle_timeout: Duration,
    ) -> Result<TouchOutcome, AuthError>;

    /// Stores `token` as the session's CSRF token. Returns `false` when the
    /// session does not exist.
    async fn set_csrf_token(&self, session_id: &str, token: &str) -> Result<bool, AuthError>;

    /// Removes sessions idle for longer than `idle_timeout`.
    ///
    /// Returns the number of sessions pruned.
    async fn prune_idle(&self, idle_timeout: Duration) -> Result<u64, AuthError>;
}

#[async_trait]
impl<T> SessionRepository for std::sync::Arc<T>
where
    T: SessionRepository + ?Sized,
{
    async fn create(&self, data: SessionData) -> Result<String, AuthError> {
        (**self).create(data).await
    }

    async fn load(&self, session_id: &str) -> Result<Option<Session>, AuthError> {
        (**self).load(session_id).await
    }

    async fn save(&self, session_id: &str, data: SessionData) -> Result<(), AuthError> {
        (**self).save(session_id, data).await
    }

    async fn destroy(&self, session_id: &str) -> Result<(), AuthError> {
        (**self).destroy(session_id).await
    }

    async fn touch(
        &self,
        session_id: &str,
        fingerprint: &str,
        idle_timeout: Duration,
    ) -> Result<TouchOutcome, AuthError> {
        (**self).touch(session_id, fingerprint, idle_timeout).await
    }

    async fn set_csrf_token(&self, session_id: &str, token: &str) -> Result<bool, AuthError> {
        (**self).set_csrf_token(session_id, token).await
    }

    async fn prune_idle(&self, idle_timeout: Duration) -> Result<u64, AuthError> {
        (**self).prune_idle(idle_timeout).await
    }
}
