//! Periodic cleanup: run from a scheduler outside request handling.

use chrono::{Duration, Utc};

use crate::AuthError;
use crate::events::{AuthEvent, dispatch};
use crate::rate_limit::RateLimiter;
use crate::repository::FailedAttemptRepository;
use crate::session::SessionRepository;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneResult {
    pub failed_attempts: u64,
    pub idle_sessions: u64,
}

impl PruneResult {
    pub fn total(&self) -> u64 {
        self.failed_attempts + self.idle_sessions
    }
}

pub struct PruneExpiredAction<F: FailedAttemptRepository, S: SessionRepository> {
    limiter: RateLimiter<F>,
    sessions: S,
    idle_timeout: Duration,
}

impl<F, S> PruneExpiredAction<F, S>
where
    F: FailedAttemptRepository,
    S: SessionRepository,
{
    pub fn new(limiter: RateLimiter<F>, sessions: S, idle_timeout: Duration) -> Self {
        Self {
            limiter,
            sessions,
            idle_timeout,
        }
    }

    /// Deletes failed-attempt records older than the window and sessions
    /// idle past the timeout. Safe to run repeatedly.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self), name = "prune_expired")
    )]
    pub async fn execute(&self) -> Result<PruneResult, AuthError> {
        let failed_attempts = self.limiter.cleanup_old_records().await?;
        let idle_sessions = self.sessions.prune_idle(self.idle_timeout).await?;

        log::info!(
            target: "vitrine_auth",
            "msg=\"pruned\" failed_attempts={failed_attempts} idle_sessions={idle_sessions}"
        );
        dispatch(AuthEvent::FailedAttemptsPruned {
            records: failed_attempts,
            sessions: idle_sessions,
            at: Utc::now(),
        })
        .await;

        Ok(PruneResult {
            failed_attempts,
            idle_sessions,
        })
    }
}
