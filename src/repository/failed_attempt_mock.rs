use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::AuthError;

use super::failed_attempt::{FailedAttempt, FailedAttemptRepository};

#[derive(Clone, Default)]
pub struct MockFailedAttemptRepository {
    pub attempts: Arc<Mutex<Vec<FailedAttempt>>>,
    unavailable: Arc<AtomicBool>,
}

impl MockFailedAttemptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Inserts a record with an explicit timestamp.
    pub fn push_at(&self, username: Option<&str>, ip_address: &str, at: DateTime<Utc>) {
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.push(FailedAttempt {
                username: username.map(ToOwned::to_owned),
                ip_address: ip_address.to_owned(),
                attempted_at: at,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.attempts.lock().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn guard(&self) -> Result<MutexGuard<'_, Vec<FailedAttempt>>, AuthError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::DatabaseError("attempt ledger unavailable".to_owned()));
        }
        self.attempts
            .lock()
            .map_err(|_| AuthError::DatabaseError("Lock poisoned".to_owned()))
    }
}

#[async_trait]
impl FailedAttemptRepository for MockFailedAttemptRepository {
    async fn record(&self, username: Option<&str>, ip_address: &str) -> Result<(), AuthError> {
        let mut attempts = self.guard()?;
        attempts.push(FailedAttempt {
            username: username.map(ToOwned::to_owned),
            ip_address: ip_address.to_owned(),
            attempted_at: Utc::now(),
        });
        drop(attempts);

        Ok(())
    }

    async fn count_since(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, AuthError> {
        let count = {
            let attempts = self.guard()?;
            attempts
                .iter()
                .filter(|a| a.ip_address == ip_address && a.attempted_at > since)
                .count()
        };
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn clear_for_address(&self, ip_address: &str) -> Result<(), AuthError> {
        let mut attempts = self.guard()?;
        attempts.retain(|a| a.ip_address != ip_address);
        drop(attempts);
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut attempts = self.guard()?;
        let before = attempts.len();
        attempts.retain(|a| a.attempted_at >= cutoff);
        let removed = before.saturating_sub(attempts.len());
        drop(attempts);
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}
