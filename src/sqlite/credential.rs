use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use super::database_error;
use crate::{AuthError, Credential, CredentialRepository, Role};

#[derive(Clone)]
pub struct SqliteCredentialRepository {
    pool: SqlitePool,
}

impl SqliteCredentialRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CredentialRecord {
    id: i64,
    username: String,
    password_hash: String,
    role: String,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CredentialRecord> for Credential {
    type Error = AuthError;

    fn try_from(row: CredentialRecord) -> Result<Self, Self::Error> {
        Ok(Credential {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role: row.role.parse()?,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl CredentialRepository for SqliteCredentialRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, AuthError> {
        let row: Option<CredentialRecord> = sqlx::query_as(
            "SELECT id, username, password_hash, role, last_login_at, created_at FROM credentials WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("find_by_username", &e))?;

        row.map(Credential::try_from).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn update_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), AuthError> {
        sqlx::query("UPDATE credentials SET last_login_at = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("update_last_login", &e))?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn count_credentials(&self) -> Result<u64, AuthError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM credentials")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("count_credentials", &e))?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, password_hash), err))]
    async fn create_credential(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<Credential, AuthError> {
        let row: CredentialRecord = sqlx::query_as(
            "INSERT INTO credentials (username, password_hash, role, created_at) VALUES (?, ?, ?, ?) RETURNING id, username, password_hash, role, last_login_at, created_at",
        )
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("create_credential", &e))?;

        row.try_into()
    }
}
