#![allow(
    clippy::print_stdout,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::doc_markdown
)]

//! Admin authentication server backed by SQLite.
//!
//! Run with: `cargo run --example admin_server --features "axum_api sqlx_sqlite"`
//!
//! Environment variables:
//!   DATABASE_URL=sqlite:./vitrine.db?mode=rwc (optional, defaults to in-memory)
//!   SESSION_SECRET=<at least 32 bytes>       (required)
//!   ADMIN_USERNAME / ADMIN_PASSWORD          (creates the first admin if none exists)
//!   RUST_LOG=vitrine_auth=info               (log filter)
//!
//! Flow:
//!   curl -c jar -b jar http://localhost:8080/admin/login
//!   curl -c jar -b jar -X POST http://localhost:8080/admin/login \
//!     -d "username=admin&password=...&csrf_token=<token from the first call>"
//!   curl -c jar -b jar http://localhost:8080/admin/session

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use vitrine::actions::{BootstrapAdminAction, PruneExpiredAction};
use vitrine::api::axum::{AppState, admin_routes};
use vitrine::crypto::Argon2Hasher;
use vitrine::events::listeners::LoggingListener;
use vitrine::rate_limit::RateLimiter;
use vitrine::session::InMemorySessionRepository;
use vitrine::sqlite::{
    SqliteCredentialRepository, SqliteFailedAttemptRepository, create_repositories, migrations,
};
use vitrine::{AuthConfig, AuthError, SecretString, register_event_listeners};

const PRUNE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    register_event_listeners(|registry| {
        registry.listen(LoggingListener::new());
    });

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_owned());
    let pool = SqlitePoolOptions::new()
        // an in-memory database exists per connection
        .max_connections(if database_url.contains(":memory:") { 1 } else { 5 })
        .connect(&database_url)
        .await
        .expect("Failed to create pool");
    migrations::run(&pool)
        .await
        .expect("Failed to run migrations");

    let (credentials, attempts) = create_repositories(pool);
    // Bootstrap and login share parameters so unknown usernames cost the same.
    let hasher = Argon2Hasher::production();

    if let (Ok(username), Ok(password)) = (
        std::env::var("ADMIN_USERNAME"),
        std::env::var("ADMIN_PASSWORD"),
    ) {
        match BootstrapAdminAction::new(credentials.clone())
            .with_hasher(hasher.clone())
            .execute(&username, &password, &password)
            .await
        {
            Ok(admin) => println!("Created administrator '{}'", admin.username),
            Err(AuthError::AdminAlreadyExists) => println!("Administrator already exists"),
            Err(e) => panic!("Bootstrap failed: {e}"),
        }
    }

    let mut config = AuthConfig::development();
    config.session.secret_key =
        SecretString::new(std::env::var("SESSION_SECRET").expect("SESSION_SECRET must be set"));

    let sessions = InMemorySessionRepository::new();
    let prune = PruneExpiredAction::new(
        RateLimiter::new(attempts.clone(), config.rate_limit.clone()),
        sessions.clone(),
        config.session.idle_timeout,
    );
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = prune.execute().await {
                log::warn!(target: "vitrine_auth", "msg=\"prune failed\" error=\"{e}\"");
            }
        }
    });

    let state = AppState::with_hasher(credentials, attempts, sessions, config, hasher)
        .expect("Invalid config");

    let app = Router::new()
        .nest(
            "/admin",
            admin_routes::<
                SqliteCredentialRepository,
                SqliteFailedAttemptRepository,
                InMemorySessionRepository,
                Argon2Hasher,
            >(),
        )
        .with_state(state);

    println!("Starting vitrine admin server on http://localhost:8080");
    println!("Endpoints:");
    println!("  GET  /admin/login   - Login form token");
    println!("  POST /admin/login   - Login (sets session cookie)");
    println!("  GET  /admin/session - Current admin and form token");
    println!("  POST /admin/logout  - Logout");

    let listener = TcpListener::bind("127.0.0.1:8080").await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
