use chrono::{DateTime, Utc};

/// Authentication events emitted by vitrine actions.
///
/// These carry the detailed denial reasons that never reach a response.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    // login
    LoginSucceeded {
        user_id: i64,
        username: String,
        address: String,
        at: DateTime<Utc>,
    },
    LoginFailed {
        username: String,
        address: String,
        reason: String,
        at: DateTime<Utc>,
    },
    LoginBlocked {
        address: String,
        attempts: u32,
        at: DateTime<Utc>,
    },
    LoginThrottled {
        address: String,
        delay_ms: u64,
        at: DateTime<Utc>,
    },

    // session
    LogoutSucceeded {
        user_id: Option<i64>,
        at: DateTime<Utc>,
    },
    SessionInvalidated {
        reason: String,
        at: DateTime<Utc>,
    },
    CsrfRejected {
        at: DateTime<Utc>,
    },

    // maintenance
    AdminBootstrapped {
        user_id: i64,
        username: String,
        at: DateTime<Utc>,
    },
    FailedAttemptsPruned {
        records: u64,
        sessions: u64,
        at: DateTime<Utc>,
    },
}

impl AuthEvent {
    /// Returns a dot-separated event name for logging/tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoginSucceeded { .. } => "auth.login.succeeded",
            Self::LoginFailed { .. } => "auth.login.failed",
            Self::LoginBlocked { .. } => "auth.login.blocked",
            Self::LoginThrottled { .. } => "auth.login.throttled",
            Self::LogoutSucceeded { .. } => "auth.logout.succeeded",
            Self::SessionInvalidated { .. } => "auth.session.invalidated",
            Self::CsrfRejected { .. } => "auth.csrf.rejected",
            Self::AdminBootstrapped { .. } => "admin.bootstrapped",
            Self::FailedAttemptsPruned { .. } => "maintenance.pruned",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::LoginSucceeded { at, .. }
            | Self::LoginFailed { at, .. }
            | Self::LoginBlocked { at, .. }
            | Self::LoginThrottled { at, .. }
            | Self::LogoutSucceeded { at, .. }
            | Self::SessionInvalidated { at, .. }
            | Self::CsrfRejected { at }
            | Self::AdminBootstrapped { at, .. }
            | Self::FailedAttemptsPruned { at, .. } => *at,
        }
    }

    /// True for events that indicate an attack or a misbehaving client.
    pub fn is_security_relevant(&self) -> bool {
        matches!(
            self,
            Self::LoginBlocked { .. } | Self::SessionInvalidated { .. } | Self::CsrfRejected { .. }
        )
    }
}
