//! `SQLite` implementations of the repository traits (feature `sqlx_sqlite`).

mod credential;
mod failed_attempt;
pub mod migrations;

pub use credential::SqliteCredentialRepository;
pub use failed_attempt::SqliteFailedAttemptRepository;
use sqlx::SqlitePool;

/// Creates both repositories from one connection pool.
pub fn create_repositories(
    pool: SqlitePool,
) -> (SqliteCredentialRepository, SqliteFailedAttemptRepository) {
    (
        SqliteCredentialRepository::new(pool.clone()),
        SqliteFailedAttemptRepository::new(pool),
    )
}

fn database_error(operation: &str, e: &sqlx::Error) -> crate::AuthError {
    log::error!(target: "vitrine_auth", "msg=\"database error\" operation=\"{operation}\" error=\"{e}\"");
    crate::AuthError::DatabaseError(e.to_string())
}
