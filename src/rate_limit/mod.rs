//! Brute-force throttling for the login form.
//!
//! Failed logins are counted per client address over a trailing window.
//! Below the lockout threshold nothing happens; from the threshold on each
//! attempt waits `base_delay * 2^(attempts - threshold)`; at the hard limit
//! the attempt is refused before any credential is looked at.

mod limiter;

pub use limiter::{RateLimitDecision, RateLimiter, apply_delay};
