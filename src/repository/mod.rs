//! Repository traits and data types.
//!
//! The core reads and writes persistent state only through these traits.
//! Implement them for your own database or use the SQLite backend
//! (`sqlx_sqlite` feature).
//!
//! | Trait | Description |
//! |-------|-------------|
//! | [`CredentialRepository`] | Administrator accounts |
//! | [`FailedAttemptRepository`] | Failed-login ledger read by the rate limiter |
//!
//! Sessions have their own store, see [`crate::session::SessionRepository`].
//!
//! Enable the `mocks` feature for in-memory implementations:
//! [`MockCredentialRepository`] and [`MockFailedAttemptRepository`].

mod credential;
mod failed_attempt;

#[cfg(any(test, feature = "mocks"))]
mod credential_mock;
#[cfg(any(test, feature = "mocks"))]
mod failed_attempt_mock;

pub use credential::{Credential, CredentialRepository, Role};
pub use failed_attempt::{FailedAttempt, FailedAttemptRepository};

#[cfg(any(test, feature = "mocks"))]
pub use credential_mock::MockCredentialRepository;
#[cfg(any(test, feature = "mocks"))]
pub use failed_attempt_mock::MockFailedAttemptRepository;
