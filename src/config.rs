//! Configuration types for the vitrine authentication core.
//!
//! ```rust
//! use vitrine::config::{AuthConfig, RateLimitConfig};
//! use chrono::Duration;
//!
//! let config = AuthConfig {
//!     rate_limit: RateLimitConfig {
//!         lockout_threshold: 5,
//!         hard_limit: 10,
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! assert_eq!(config.rate_limit.window, Duration::seconds(900));
//! ```

use chrono::Duration;

use crate::AuthError;
use crate::session::SessionConfig;

/// Top-level configuration for the admin authentication core.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub session: SessionConfig,
    pub rate_limit: RateLimitConfig,
    pub csrf: CsrfConfig,
}

impl AuthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insecure-cookie settings for local HTTP development.
    pub fn development() -> Self {
        Self {
            session: SessionConfig {
                cookie_secure: false,
                ..SessionConfig::default()
            },
            ..Self::default()
        }
    }

    /// Shorter idle timeout and an earlier lockout.
    pub fn strict() -> Self {
        Self {
            session: SessionConfig {
                idle_timeout: Duration::minutes(15),
                ..SessionConfig::default()
            },
            rate_limit: RateLimitConfig {
                window: Duration::minutes(30),
                lockout_threshold: 5,
                hard_limit: 10,
                base_delay_ms: 200,
            },
            csrf: CsrfConfig::default(),
        }
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ConfigurationError` naming the first problem found.
    pub fn validate(&self) -> Result<(), AuthError> {
        self.session
            .validate()
            .and(self.rate_limit.validate())
            .and(self.csrf.validate())
            .map_err(|msg| AuthError::ConfigurationError(msg.to_owned()))
    }
}

/// Brute-force throttling policy, counted per client address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Trailing window failed attempts are counted over.
    ///
    /// Default: 15 minutes
    pub window: Duration,

    /// Attempt count at which exponential delays start.
    ///
    /// Default: 10
    pub lockout_threshold: u32,

    /// Attempt count at which logins are refused outright.
    ///
    /// Default: 20
    pub hard_limit: u32,

    /// Delay at the threshold, doubled for every attempt past it.
    ///
    /// Default: 100 ms
    pub base_delay_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::seconds(900),
            lockout_threshold: 10,
            hard_limit: 20,
            base_delay_ms: 100,
        }
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.window <= Duration::zero() {
            return Err("rate limit window must be positive");
        }
        if self.hard_limit == 0 {
            return Err("hard_limit must be at least 1");
        }
        if self.lockout_threshold >= self.hard_limit {
            return Err("lockout_threshold must be below hard_limit");
        }
        Ok(())
    }
}

/// Anti-forgery token settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfConfig {
    /// Hidden form field carrying the token.
    pub field_name: String,
    /// Random bytes per token, hex-encoded on the wire.
    pub token_bytes: usize,
    /// Cookie holding the signed pre-login token.
    pub login_cookie_name: String,
    /// Lifetime of the pre-login cookie.
    pub login_token_lifetime: Duration,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            field_name: "csrf_token".to_owned(),
            token_bytes: 32,
            login_cookie_name: "vitrine_login_csrf".to_owned(),
            login_token_lifetime: Duration::minutes(30),
        }
    }
}

impl CsrfConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.token_bytes < 32 {
            return Err("csrf token_bytes must be at least 32");
        }
        if self.field_name.is_empty() {
            return Err("csrf field_name must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SecretString;

    fn with_secret(mut config: AuthConfig) -> AuthConfig {
        config.session.secret_key = SecretString::new("0123456789abcdef0123456789abcdef");
        config
    }

    #[test]
    fn test_rate_limit_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(config.window.num_seconds(), 900);
        assert_eq!(config.lockout_threshold, 10);
        assert_eq!(config.hard_limit, 20);
        assert_eq!(config.base_delay_ms, 100);
    }

    #[test]
    fn test_csrf_defaults() {
        let config = CsrfConfig::default();
        assert_eq!(config.field_name, "csrf_token");
        assert_eq!(config.token_bytes, 32);
    }

    #[test]
    fn test_presets_validate() {
        assert!(with_secret(AuthConfig::default()).validate().is_ok());
        assert!(with_secret(AuthConfig::development()).validate().is_ok());
        assert!(with_secret(AuthConfig::strict()).validate().is_ok());
    }

    #[test]
    fn test_missing_secret_fails_validation() {
        let err = AuthConfig::default().validate().unwrap_err();
        assert!(matches!(err, AuthError::ConfigurationError(_)));
    }

    #[test]
    fn test_threshold_must_be_below_hard_limit() {
        let config = RateLimitConfig {
            lockout_threshold: 20,
            hard_limit: 20,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_short_csrf_tokens_rejected() {
        let config = CsrfConfig {
            token_bytes: 16,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
