use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// One failed login. `username` is kept for forensics only; counting is by
/// address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedAttempt {
    pub username: Option<String>,
    pub ip_address: String,
    pub attempted_at: DateTime<Utc>,
}

/// Ledger of failed logins.
///
/// `record` and `clear_for_address` must each be a single atomic write.
#[async_trait]
pub trait FailedAttemptRepository: Send + Sync {
    async fn record(&self, username: Option<&str>, ip_address: &str) -> Result<(), AuthError>;

    async fn count_since(&self, ip_address: &str, since: DateTime<Utc>)
    -> Result<u32, AuthError>;

    async fn clear_for_address(&self, ip_address: &str) -> Result<(), AuthError>;

    /// Deletes records older than `cutoff`, returning how many went.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, AuthError>;
}
