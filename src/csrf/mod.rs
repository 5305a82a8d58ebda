//! Anti-forgery tokens.
//!
//! [`CsrfProtection`] binds one token to each admin session. The token is
//! reused across submissions until it is regenerated (at login). Forms shown
//! before a session exists use [`LoginFormCsrf`] instead.

mod login_form;
mod token;

pub use login_form::{LoginCsrfToken, LoginFormCsrf};
pub use token::{CsrfProtection, token_field};
