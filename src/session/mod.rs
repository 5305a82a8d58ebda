//! Server-side admin sessions.
//!
//! A session is created only after credentials verify, is keyed by a fresh
//! random id, and is bound to the client's user agent. It ends after
//! [`SessionConfig::idle_timeout`] without a request.

mod config;
mod cookie;
mod file_store;
mod memory_store;
mod repository;

use chrono::{DateTime, Duration, Utc};
pub use config::{SameSite, SessionConfig};
pub use cookie::{sign_session_id, verify_signed_cookie};
pub use file_store::FileSessionRepository;
pub use memory_store::InMemorySessionRepository;
pub use repository::SessionRepository;
use serde::{Deserialize, Serialize};

use crate::repository::{Credential, Role};

/// Length of a freshly generated session id.
pub const SESSION_ID_LENGTH: usize = 48;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    /// Fingerprint captured at login.
    pub user_agent: String,
    pub ip_address: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub csrf_token: Option<String>,
}

impl SessionData {
    /// Builds the state stored for `credential` right after a successful login.
    pub fn for_credential(credential: &Credential, user_agent: &str, ip_address: &str) -> Self {
        let now = Utc::now();
        Self {
            user_id: credential.id,
            username: credential.username.clone(),
            role: credential.role,
            user_agent: user_agent.to_owned(),
            ip_address: ip_address.to_owned(),
            created_at: now,
            last_activity: now,
            csrf_token: None,
        }
    }

    pub fn is_idle(&self, idle_timeout: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_activity > idle_timeout
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub data: SessionData,
}

impl Session {
    pub fn new(id: String, data: SessionData) -> Self {
        Self { id, data }
    }
}

/// Result of [`SessionRepository::touch`].
///
/// Every variant other than `Active` means the session no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TouchOutcome {
    Active(Session),
    Missing,
    FingerprintMismatch,
    Expired,
}

impl TouchOutcome {
    pub fn into_session(self) -> Option<Session> {
        match self {
            Self::Active(session) => Some(session),
            _ => None,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::Active(_) => "active",
            Self::Missing => "missing",
            Self::FingerprintMismatch => "fingerprint_mismatch",
            Self::Expired => "idle_timeout",
        }
    }
}

/// Applies the idle and fingerprint rules to `data` as of `now`.
///
/// Shared by the store implementations so both decide identically. On
/// `Active` the caller must persist the refreshed `last_activity`.
pub(crate) fn evaluate_touch(
    data: &mut SessionData,
    fingerprint: &str,
    idle_timeout: Duration,
    now: DateTime<Utc>,
) -> Result<(), TouchOutcome> {
    if data.user_agent != fingerprint {
        return Err(TouchOutcome::FingerprintMismatch);
    }
    if data.is_idle(idle_timeout, now) {
        return Err(TouchOutcome::Expired);
    }
    data.last_activity = now;
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_session_data(user_id: i64) -> SessionData {
    let now = Utc::now();
    SessionData {
        user_id,
        username: format!("admin{user_id}"),
        role: Role::Admin,
        user_agent: "test-agent/1.0".to_owned(),
        ip_address: "203.0.113.7".to_owned(),
        created_at: now,
        last_activity: now,
        csrf_token: None,
    }
}
