use chrono::{DateTime, Utc};

use crate::SecretString;
use crate::config::CsrfConfig;
use crate::crypto::{constant_time_eq, generate_hex_token};
use crate::session::{sign_session_id, verify_signed_cookie};

const PAYLOAD_PREFIX: &str = "login-csrf";

/// Token pair for the login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCsrfToken {
    /// Value for the hidden form field.
    pub token: String,
    /// Signed value for the short-lived cookie.
    pub cookie_value: String,
}

/// Double-submit CSRF protection for the login form.
///
/// The login page has no session to bind a token to, and creating one for an
/// anonymous visitor is not allowed. Instead a random nonce goes into the
/// form and an HMAC-signed copy, stamped with its issue time, into an
/// HTTP-only cookie. A forged cross-site post cannot read the cookie and so
/// cannot supply a matching nonce.
pub struct LoginFormCsrf {
    secret: SecretString,
    config: CsrfConfig,
}

impl LoginFormCsrf {
    pub fn new(secret: SecretString, config: CsrfConfig) -> Self {
        Self { secret, config }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.login_cookie_name
    }

    pub fn field_name(&self) -> &str {
        &self.config.field_name
    }

    pub fn issue(&self) -> LoginCsrfToken {
        self.issue_at(Utc::now())
    }

    fn issue_at(&self, now: DateTime<Utc>) -> LoginCsrfToken {
        let token = generate_hex_token(self.config.token_bytes);
        let payload = format!("{PAYLOAD_PREFIX}:{}:{token}", now.timestamp());
        LoginCsrfToken {
            cookie_value: sign_session_id(&payload, &self.secret),
            token,
        }
    }

    /// Checks the cookie signature, its age and that the form nonce matches.
    pub fn validate(&self, cookie_value: Option<&str>, supplied: Option<&str>) -> bool {
        self.validate_at(cookie_value, supplied, Utc::now())
    }

    fn validate_at(
        &self,
        cookie_value: Option<&str>,
        supplied: Option<&str>,
        now: DateTime<Utc>,
    ) -> bool {
        let (Some(cookie_value), Some(supplied)) = (cookie_value, supplied) else {
            return false;
        };
        let Some(payload) = verify_signed_cookie(cookie_value, &self.secret) else {
            return false;
        };

        let mut parts = payload.splitn(3, ':');
        let (Some(PAYLOAD_PREFIX), Some(issued), Some(nonce)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        let Some(issued) = issued
            .parse::<i64>()
            .ok()
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
        else {
            return false;
        };

        if now - issued > self.config.login_token_lifetime || issued > now {
            log::debug!(target: "vitrine_auth::csrf", "msg=\"login csrf cookie outside lifetime\"");
            return false;
        }

        constant_time_eq(nonce.as_bytes(), supplied.as_bytes())
    }
}
