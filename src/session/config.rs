use chrono::Duration;

use crate::SecretString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    None,
    Lax,
    #[default]
    Strict,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub cookie_path: String,
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    pub cookie_http_only: bool,
    pub cookie_same_site: SameSite,
    /// Inactivity after which a session is destroyed.
    pub idle_timeout: Duration,
    /// HMAC key for signing session cookies.
    pub secret_key: SecretString,
    /// Where unauthenticated requests are redirected.
    pub login_path: String,
    /// Where a successful login redirects.
    pub dashboard_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "vitrine_session".to_owned(),
            cookie_path: "/".to_owned(),
            cookie_domain: None,
            cookie_secure: true,
            cookie_http_only: true,
            cookie_same_site: SameSite::Strict,
            idle_timeout: Duration::seconds(3600),
            secret_key: SecretString::new(""),
            login_path: "/admin/login".to_owned(),
            dashboard_path: "/admin/dashboard".to_owned(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.secret_key.is_empty() {
            return Err("secret_key must not be empty");
        }
        if self.secret_key.len() < 32 {
            return Err("secret_key should be at least 32 bytes");
        }
        if self.idle_timeout <= Duration::zero() {
            return Err("idle_timeout must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.cookie_name, "vitrine_session");
        assert_eq!(config.idle_timeout.num_seconds(), 3600);
        assert!(config.cookie_secure);
        assert!(config.cookie_http_only);
        assert_eq!(config.cookie_same_site, SameSite::Strict);
        assert_eq!(config.login_path, "/admin/login");
    }

    #[test]
    fn test_validate_short_secret() {
        let config = SessionConfig {
            secret_key: SecretString::new("short"),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_idle_timeout() {
        let config = SessionConfig {
            secret_key: SecretString::new("this-is-a-very-long-secret-key-for-testing"),
            idle_timeout: Duration::zero(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err("idle_timeout must be positive"));
    }
}
