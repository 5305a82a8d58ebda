use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::database_error;
use crate::{AuthError, FailedAttemptRepository};

/// Failed-login ledger in the `failed_logins` table.
///
/// Timestamps are bound as `DateTime<Utc>`, which sqlx stores as RFC 3339
/// text with a fixed offset, so string comparison orders them correctly.
#[derive(Clone)]
pub struct SqliteFailedAttemptRepository {
    pool: SqlitePool,
}

impl SqliteFailedAttemptRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FailedAttemptRepository for SqliteFailedAttemptRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, username), err))]
    async fn record(&self, username: Option<&str>, ip_address: &str) -> Result<(), AuthError> {
        sqlx::query("INSERT INTO failed_logins (username, ip_address, attempted_at) VALUES (?, ?, ?)")
            .bind(username)
            .bind(ip_address)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("record_failed_attempt", &e))?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn count_since(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, AuthError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM failed_logins WHERE ip_address = ? AND attempted_at > ?",
        )
        .bind(ip_address)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("count_failed_attempts", &e))?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn clear_for_address(&self, ip_address: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM failed_logins WHERE ip_address = ?")
            .bind(ip_address)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("clear_failed_attempts", &e))?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM failed_logins WHERE attempted_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("prune_failed_attempts", &e))?;

        Ok(result.rows_affected())
    }
}
