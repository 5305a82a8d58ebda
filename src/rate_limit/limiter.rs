use chrono::Utc;

use crate::AuthError;
use crate::client::normalize_address;
use crate::config::RateLimitConfig;
use crate::repository::FailedAttemptRepository;

/// Outcome of [`RateLimiter::check_rate_limit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub attempt_count: u32,
    pub delay_ms: u64,
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    pub fn is_throttled(&self) -> bool {
        self.allowed && self.delay_ms > 0
    }
}

/// Per-address failed-login limiter over a [`FailedAttemptRepository`].
///
/// # Example
///
/// ```rust,ignore
/// use vitrine::config::RateLimitConfig;
/// use vitrine::rate_limit::RateLimiter;
/// use vitrine::MockFailedAttemptRepository;
///
/// let limiter = RateLimiter::new(MockFailedAttemptRepository::new(), RateLimitConfig::default());
/// assert_eq!(limiter.delay_for(9), 0);
/// assert_eq!(limiter.delay_for(10), 100);
/// assert_eq!(limiter.delay_for(11), 200);
/// ```
pub struct RateLimiter<F>
where
    F: FailedAttemptRepository,
{
    attempts: F,
    config: RateLimitConfig,
}

impl<F: FailedAttemptRepository> RateLimiter<F> {
    pub fn new(attempts: F, config: RateLimitConfig) -> Self {
        Self { attempts, config }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Delay in milliseconds owed by a client with `attempts` failures.
    ///
    /// Zero below the threshold. The exponent is clamped so the result
    /// saturates instead of overflowing for oversized configurations.
    pub fn delay_for(&self, attempts: u32) -> u64 {
        if attempts < self.config.lockout_threshold {
            return 0;
        }
        let exponent = (attempts - self.config.lockout_threshold).min(63);
        self.config.base_delay_ms.saturating_mul(1u64 << exponent)
    }

    /// Counts failures for `address` within the window and applies the policy.
    ///
    /// # Errors
    ///
    /// `InvalidAddress` when `address` is not an IP address, or the ledger's
    /// error. Callers treat any error as "not allowed".
    pub async fn check_rate_limit(&self, address: &str) -> Result<RateLimitDecision, AuthError> {
        let address = normalize_address(address)?;
        let since = Utc::now() - self.config.window;
        let attempt_count = self.attempts.count_since(&address, since).await?;

        if attempt_count >= self.config.hard_limit {
            return Ok(RateLimitDecision {
                allowed: false,
                attempt_count,
                delay_ms: 0,
            });
        }

        Ok(RateLimitDecision {
            allowed: true,
            attempt_count,
            delay_ms: self.delay_for(attempt_count),
        })
    }

    /// Appends a failure. `username` is `None` when it was not supplied.
    pub async fn record_failed_attempt(
        &self,
        username: Option<&str>,
        address: &str,
    ) -> Result<(), AuthError> {
        let address = normalize_address(address)?;
        self.attempts.record(username, &address).await
    }

    /// Clears the ledger for `address` after a successful login.
    pub async fn reset_attempts(&self, address: &str) -> Result<(), AuthError> {
        let address = normalize_address(address)?;
        self.attempts.clear_for_address(&address).await
    }

    /// Deletes records that have fallen out of the window.
    pub async fn cleanup_old_records(&self) -> Result<u64, AuthError> {
        let cutoff = Utc::now() - self.config.window;
        let removed = self.attempts.delete_older_than(cutoff).await?;
        log::debug!(target: "vitrine_auth", "msg=\"failed-attempt cleanup\" removed={removed}");
        Ok(removed)
    }

    pub async fn apply_delay(&self, delay_ms: u64) {
        apply_delay(delay_ms).await;
    }
}

/// Sleeps for `delay_ms`. Dropping the future cancels the wait.
pub async fn apply_delay(delay_ms: u64) {
    if delay_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::repository::MockFailedAttemptRepository;

    const ADDR: &str = "198.51.100.23";

    fn limiter() -> (RateLimiter<MockFailedAttemptRepository>, MockFailedAttemptRepository) {
        let repo = MockFailedAttemptRepository::new();
        (
            RateLimiter::new(repo.clone(), RateLimitConfig::default()),
            repo,
        )
    }

    async fn fail_n(limiter: &RateLimiter<MockFailedAttemptRepository>, n: u32) {
        for _ in 0..n {
            limiter.record_failed_attempt(Some("admin"), ADDR).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_below_threshold_no_delay() {
        let (limiter, _) = limiter();
        for n in 0..10 {
            let decision = limiter.check_rate_limit(ADDR).await.unwrap();
            assert_eq!(
                decision,
                RateLimitDecision {
                    allowed: true,
                    attempt_count: n,
                    delay_ms: 0
                }
            );
            assert!(!decision.is_throttled());
            fail_n(&limiter, 1).await;
        }
    }

    #[tokio::test]
    async fn test_exponential_backoff_then_block() {
        let (limiter, _) = limiter();
        fail_n(&limiter, 10).await;

        let mut previous = 0;
        for n in 10..20 {
            let decision = limiter.check_rate_limit(ADDR).await.unwrap();
            assert!(decision.is_allowed() && decision.is_throttled());
            assert_eq!(decision.attempt_count, n);
            assert_eq!(decision.delay_ms, 100 * (1 << (n - 10)));
            assert!(decision.delay_ms > previous);
            previous = decision.delay_ms;
            fail_n(&limiter, 1).await;
        }

        let decision = limiter.check_rate_limit(ADDR).await.unwrap();
        assert!(!decision.is_allowed());
        assert!(!decision.is_throttled());
        assert_eq!(decision.attempt_count, 20);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_records_are_all_counted() {
        let (limiter, repo) = limiter();
        let limiter = std::sync::Arc::new(limiter);

        let mut handles = Vec::new();
        for i in 0..32 {
            let limiter = std::sync::Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter
                    .record_failed_attempt(Some(&format!("user{i}")), ADDR)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(repo.len(), 32);
        assert_eq!(limiter.check_rate_limit(ADDR).await.unwrap().attempt_count, 32);
    }

    #[tokio::test]
    async fn test_counts_by_address_not_username() {
        let (limiter, _) = limiter();
        for i in 0..20 {
            limiter
                .record_failed_attempt(Some(&format!("user{i}")), ADDR)
                .await
                .unwrap();
        }
        limiter.record_failed_attempt(None, ADDR).await.unwrap();

        assert!(!limiter.check_rate_limit(ADDR).await.unwrap().allowed);
        assert!(limiter.check_rate_limit("198.51.100.24").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_old_records_outside_window() {
        let (limiter, repo) = limiter();
        let old = Utc::now() - Duration::seconds(901);
        for _ in 0..25 {
            repo.push_at(None, ADDR, old);
        }

        let decision = limiter.check_rate_limit(ADDR).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.attempt_count, 0);

        assert_eq!(limiter.cleanup_old_records().await.unwrap(), 25);
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_reset_clears_only_that_address() {
        let (limiter, repo) = limiter();
        fail_n(&limiter, 3).await;
        limiter.record_failed_attempt(None, "2001:db8::1").await.unwrap();

        limiter.reset_attempts(ADDR).await.unwrap();
        assert_eq!(limiter.check_rate_limit(ADDR).await.unwrap().attempt_count, 0);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_ipv6_and_mapped_addresses() {
        let (limiter, _) = limiter();
        limiter.record_failed_attempt(None, "2001:DB8::1").await.unwrap();
        limiter.record_failed_attempt(None, "::ffff:198.51.100.23").await.unwrap();

        assert_eq!(
            limiter.check_rate_limit("2001:db8::1").await.unwrap().attempt_count,
            1
        );
        assert_eq!(limiter.check_rate_limit(ADDR).await.unwrap().attempt_count, 1);
    }

    #[tokio::test]
    async fn test_invalid_address_rejected() {
        let (limiter, _) = limiter();
        assert_eq!(
            limiter.check_rate_limit("not-an-ip").await,
            Err(AuthError::InvalidAddress)
        );
        assert_eq!(
            limiter.record_failed_attempt(None, "").await,
            Err(AuthError::InvalidAddress)
        );
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let (limiter, repo) = limiter();
        repo.set_unavailable(true);
        assert!(matches!(
            limiter.check_rate_limit(ADDR).await,
            Err(AuthError::DatabaseError(_))
        ));
    }

    #[test]
    fn test_delay_saturates() {
        let limiter = RateLimiter::new(
            MockFailedAttemptRepository::new(),
            RateLimitConfig {
                lockout_threshold: 0,
                hard_limit: u32::MAX,
                ..Default::default()
            },
        );
        assert_eq!(limiter.delay_for(200), u64::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_delay_waits() {
        let start = tokio::time::Instant::now();
        apply_delay(400).await;
        assert!(start.elapsed() >= std::time::Duration::from_millis(400));

        let start = tokio::time::Instant::now();
        apply_delay(0).await;
        assert_eq!(start.elapsed(), std::time::Duration::ZERO);
    }
}
