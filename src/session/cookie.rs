//! HMAC-SHA256 signed cookie values.
//!
//! Also used for the pre-login CSRF cookie, see [`crate::csrf::LoginFormCsrf`].

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::SecretString;
use crate::crypto::constant_time_eq;

type HmacSha256 = Hmac<Sha256>;

/// Returns `{value}.{hex signature}`.
pub fn sign_session_id(session_id: &str, secret: &SecretString) -> String {
    let signature = compute_hmac(session_id.as_bytes(), secret.expose_secret().as_bytes());
    format!("{}.{}", session_id, hex::encode(signature))
}

/// Verifies a signed cookie value and extracts the session ID.
///
/// Returns `None` if the signature is invalid (tampered).
pub fn verify_signed_cookie(cookie_value: &str, secret: &SecretString) -> Option<String> {
    let (session_id, signature_hex) = cookie_value.rsplit_once('.')?;

    let actual_sig = hex::decode(signature_hex).ok()?;
    let expected_sig = compute_hmac(session_id.as_bytes(), secret.expose_secret().as_bytes());

    if constant_time_eq(&expected_sig, &actual_sig) {
        Some(session_id.to_owned())
    } else {
        log::warn!(target: "vitrine_auth::session", "msg=\"signed cookie tampered\" cookie_prefix=\"{}...\"", &cookie_value.chars().take(8).collect::<String>());
        None
    }
}

fn compute_hmac(message: &[u8], key: &[u8]) -> Vec<u8> {
    // HMAC-SHA256 accepts keys of any length.
    #[allow(clippy::expect_used)]
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}
