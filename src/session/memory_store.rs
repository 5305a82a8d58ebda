//! In-memory session storage.
//!
//! Suitable for development, testing, and single-instance deployments.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::AuthError;
use crate::crypto::generate_token;

use super::repository::SessionRepository;
use super::{SESSION_ID_LENGTH, Session, SessionData, TouchOutcome, evaluate_touch};

/// Stores sessions in a `HashMap` protected by a `RwLock`, keyed by id.
///
/// Sessions are lost when the process restarts.
#[derive(Clone)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<String, SessionData>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of sessions currently stored.
    pub fn len(&self) -> usize {
        self.sessions.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, SessionData>>, AuthError> {
        self.sessions
            .write()
            .map_err(|_| AuthError::DatabaseError("Lock poisoned".to_owned()))
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, data: SessionData) -> Result<String, AuthError> {
        let mut sessions = self.write()?;
        let mut session_id = generate_token(SESSION_ID_LENGTH);
        while sessions.contains_key(&session_id) {
            session_id = generate_token(SESSION_ID_LENGTH);
        }
        sessions.insert(session_id.clone(), data);
        drop(sessions);

        Ok(session_id)
    }

    async fn load(&self, session_id: &str) -> Result<Option<Session>, AuthError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| AuthError::DatabaseError("Lock poisoned".to_owned()))?;

        Ok(sessions.get(session_id).map(|data| Session {
            id: session_id.to_owned(),
            data: data.clone(),
        }))
    }

    async fn save(&self, session_id: &str, data: SessionData) -> Result<(), AuthError> {
        if let Some(slot) = self.write()?.get_mut(session_id) {
            *slot = data;
        }
        Ok(())
    }

    async fn destroy(&self, session_id: &str) -> Result<(), AuthError> {
        self.write()?.remove(session_id);
        Ok(())
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn touch(
        &self,
        session_id: &str,
        fingerprint: &str,
        idle_timeout: Duration,
    ) -> Result<TouchOutcome, AuthError> {
        let mut sessions = self.write()?;

        let Some(data) = sessions.get_mut(session_id) else {
            return Ok(TouchOutcome::Missing);
        };

        match evaluate_touch(data, fingerprint, idle_timeout, Utc::now()) {
            Ok(()) => Ok(TouchOutcome::Active(Session::new(
                session_id.to_owned(),
                data.clone(),
            ))),
            Err(outcome) => {
                sessions.remove(session_id);
                Ok(outcome)
            }
        }
    }

    async fn set_csrf_token(&self, session_id: &str, token: &str) -> Result<bool, AuthError> {
        Ok(self
            .write()?
            .get_mut(session_id)
            .map(|data| data.csrf_token = Some(token.to_owned()))
            .is_some())
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn prune_idle(&self, idle_timeout: Duration) -> Result<u64, AuthError> {
        let mut sessions = self.write()?;

        let now = Utc::now();
        let before_count = sessions.len();

        sessions.retain(|_, data| !data.is_idle(idle_timeout, now));

        let pruned = before_count.saturating_sub(sessions.len());
        Ok(u64::try_from(pruned).unwrap_or(u64::MAX))
    }
}
