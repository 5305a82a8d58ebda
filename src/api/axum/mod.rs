mod client;
mod cookies;
mod error;
mod handlers;
mod middleware;
mod routes;

pub use client::extract_client_ip;
pub use cookies::{
    clear_login_csrf_cookie, clear_session_cookie, login_csrf_cookie, session_cookie,
    session_id_from_jar,
};
pub use error::AppError;
pub use middleware::{AdminSession, require_csrf};
pub use routes::{AppState, admin_routes};
