//! HTTP boundary for the admin area (feature `axum_api`).

mod types;

pub use types::*;

pub mod axum;
