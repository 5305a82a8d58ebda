use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use axum::middleware::map_response;
use axum::response::Response;
use axum::routing::{get, post};

use super::handlers;
use crate::actions::{AuthenticateAction, LoginAction, LogoutAction};
use crate::config::AuthConfig;
use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::csrf::{CsrfProtection, LoginFormCsrf};
use crate::session::SessionRepository;
use crate::{AuthError, CredentialRepository, FailedAttemptRepository};

/// Shared state for the admin routes.
///
/// Actions are built once so the password hasher (and its cached dummy hash)
/// is shared by every request.
pub struct AppState<C, F, S, H = Argon2Hasher>
where
    C: CredentialRepository,
    F: FailedAttemptRepository,
    S: SessionRepository,
    H: PasswordHasher,
{
    pub login: Arc<LoginAction<C, F, Arc<S>, H>>,
    pub authenticate: Arc<AuthenticateAction<Arc<S>>>,
    pub logout: Arc<LogoutAction<Arc<S>>>,
    pub csrf: Arc<CsrfProtection<Arc<S>>>,
    pub login_csrf: Arc<LoginFormCsrf>,
    pub config: Arc<AuthConfig>,
}

impl<C, F, S, H> Clone for AppState<C, F, S, H>
where
    C: CredentialRepository,
    F: FailedAttemptRepository,
    S: SessionRepository,
    H: PasswordHasher,
{
    fn clone(&self) -> Self {
        Self {
            login: Arc::clone(&self.login),
            authenticate: Arc::clone(&self.authenticate),
            logout: Arc::clone(&self.logout),
            csrf: Arc::clone(&self.csrf),
            login_csrf: Arc::clone(&self.login_csrf),
            config: Arc::clone(&self.config),
        }
    }
}

impl<C, F, S> AppState<C, F, S, Argon2Hasher>
where
    C: CredentialRepository,
    F: FailedAttemptRepository,
    S: SessionRepository,
{
    /// # Errors
    ///
    /// `ConfigurationError` if `config` does not validate.
    pub fn new(
        credentials: C,
        attempts: F,
        sessions: S,
        config: AuthConfig,
    ) -> Result<Self, AuthError> {
        Self::with_hasher(
            credentials,
            attempts,
            sessions,
            config,
            Argon2Hasher::default(),
        )
    }
}

impl<C, F, S, H> AppState<C, F, S, H>
where
    C: CredentialRepository,
    F: FailedAttemptRepository,
    S: SessionRepository,
    H: PasswordHasher,
{
    pub fn with_hasher(
        credentials: C,
        attempts: F,
        sessions: S,
        config: AuthConfig,
        hasher: H,
    ) -> Result<Self, AuthError> {
        config.validate()?;

        let sessions = Arc::new(sessions);
        let login = LoginAction::new(credentials, attempts, Arc::clone(&sessions), &config)
            .with_hasher(hasher);

        Ok(Self {
            login: Arc::new(login),
            authenticate: Arc::new(AuthenticateAction::new(
                Arc::clone(&sessions),
                config.session.idle_timeout,
            )),
            logout: Arc::new(LogoutAction::new(Arc::clone(&sessions))),
            csrf: Arc::new(CsrfProtection::new(sessions, config.csrf.clone())),
            login_csrf: Arc::new(LoginFormCsrf::new(
                config.session.secret_key.clone(),
                config.csrf.clone(),
            )),
            config: Arc::new(config),
        })
    }
}

async fn no_robots(mut response: Response) -> Response {
    response.headers_mut().insert(
        HeaderName::from_static("x-robots-tag"),
        HeaderValue::from_static("noindex, nofollow, noarchive"),
    );
    response
}

/// Admin authentication routes, meant to be nested under the admin prefix:
///
/// - `GET /login` issues the pre-login CSRF token
/// - `POST /login` authenticates and sets the session cookie
/// - `POST /logout` ends the session
/// - `GET /session` describes the current session and its CSRF token
///
/// Every response carries `X-Robots-Tag: noindex, nofollow, noarchive`.
pub fn admin_routes<C, F, S, H>() -> Router<AppState<C, F, S, H>>
where
    C: CredentialRepository + 'static,
    F: FailedAttemptRepository + 'static,
    S: SessionRepository + 'static,
    H: PasswordHasher + 'static,
{
    Router::new()
        .route(
            "/login",
            get(handlers::login_page::<C, F, S, H>).post(handlers::login::<C, F, S, H>),
        )
        .route("/logout", post(handlers::logout::<C, F, S, H>))
        .route("/session", get(handlers::current_session::<C, F, S, H>))
        .layer(map_response(no_robots))
}
