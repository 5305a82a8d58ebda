//! Session and pre-login CSRF cookies.

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite as CookieSameSite};
use time::Duration;

use crate::config::AuthConfig;
use crate::session::{SameSite, SessionConfig, verify_signed_cookie};

fn same_site(value: SameSite) -> CookieSameSite {
    match value {
        SameSite::None => CookieSameSite::None,
        SameSite::Lax => CookieSameSite::Lax,
        SameSite::Strict => CookieSameSite::Strict,
    }
}

fn base_cookie(config: &SessionConfig, name: &str, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::build((name.to_owned(), value))
        .http_only(config.cookie_http_only)
        .secure(config.cookie_secure)
        .same_site(same_site(config.cookie_same_site))
        .path(config.cookie_path.clone())
        .build();
    if let Some(domain) = &config.cookie_domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}

/// Session cookie carrying the signed id. No `Max-Age`: it ends with the
/// browser, and the server enforces the idle timeout.
pub fn session_cookie(config: &SessionConfig, signed_id: String) -> Cookie<'static> {
    base_cookie(config, &config.cookie_name, signed_id)
}

pub fn clear_session_cookie(config: &SessionConfig) -> Cookie<'static> {
    let mut cookie = base_cookie(config, &config.cookie_name, String::new());
    cookie.set_max_age(Duration::ZERO);
    cookie
}

/// Short-lived cookie holding the signed pre-login token. Always HTTP-only.
pub fn login_csrf_cookie(config: &AuthConfig, signed_value: String) -> Cookie<'static> {
    let mut cookie = base_cookie(&config.session, &config.csrf.login_cookie_name, signed_value);
    cookie.set_http_only(true);
    cookie.set_max_age(Duration::seconds(
        config.csrf.login_token_lifetime.num_seconds(),
    ));
    cookie
}

pub fn clear_login_csrf_cookie(config: &AuthConfig) -> Cookie<'static> {
    let mut cookie = base_cookie(&config.session, &config.csrf.login_cookie_name, String::new());
    cookie.set_max_age(Duration::ZERO);
    cookie
}

/// Session id from the request cookie, if present and correctly signed.
pub fn session_id_from_jar(jar: &CookieJar, config: &SessionConfig) -> Option<String> {
    jar.get(&config.cookie_name)
        .and_then(|c| verify_signed_cookie(c.value(), &config.secret_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SecretString;
    use crate::session::sign_session_id;

    fn config() -> SessionConfig {
        SessionConfig {
            secret_key: SecretString::new("cookie-test-secret-0123456789abcdef"),
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(&config(), "abc.def".to_owned());
        assert_eq!(cookie.name(), "vitrine_session");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(CookieSameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_clear_cookie_expires() {
        let cookie = clear_session_cookie(&config());
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn test_session_id_from_jar() {
        let config = config();
        let signed = sign_session_id("sessionid", &config.secret_key);
        let jar = CookieJar::new().add(Cookie::new("vitrine_session", signed));
        assert_eq!(session_id_from_jar(&jar, &config).as_deref(), Some("sessionid"));

        let forged = CookieJar::new().add(Cookie::new("vitrine_session", "sessionid.00"));
        assert!(session_id_from_jar(&forged, &config).is_none());
    }
}
