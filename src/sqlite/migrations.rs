//! Embedded `SQLite` migrations.
//!
//! ```rust,ignore
//! use vitrine::sqlite::migrations;
//! use sqlx::SqlitePool;
//!
//! async fn setup_database(pool: &SqlitePool) -> Result<(), sqlx::Error> {
//!     migrations::run(pool).await?;
//!     Ok(())
//! }
//! ```

use sqlx::{Executor, SqlitePool};

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250301000001_create_credentials_table",
        include_str!("../../migrations_sqlite/20250301000001_create_credentials_table.sql"),
    ),
    (
        "20250301000002_create_failed_logins_table",
        include_str!("../../migrations_sqlite/20250301000002_create_failed_logins_table.sql"),
    ),
];

/// Applies every migration not yet recorded in `_vitrine_migrations`, in order.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    pool.execute(
        r"
        CREATE TABLE IF NOT EXISTS _vitrine_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        ",
    )
    .await?;

    for (name, sql) in MIGRATIONS {
        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _vitrine_migrations WHERE name = ?)")
                .bind(*name)
                .fetch_one(pool)
                .await?;
        if applied {
            continue;
        }

        let mut tx = pool.begin().await?;
        // Statements are split on `;`, so migration files must not contain
        // semicolons inside string literals.
        for statement in strip_comments(sql).split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                tx.execute(trimmed).await?;
            }
        }
        sqlx::query("INSERT INTO _vitrine_migrations (name) VALUES (?)")
            .bind(*name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        log::info!(target: "vitrine_auth", "msg=\"migration applied\" name=\"{name}\"");
    }

    Ok(())
}

fn strip_comments(sql: &str) -> String {
    sql.lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n")
}
