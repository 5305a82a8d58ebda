use axum::extract::FromRequestParts;
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use super::cookies::{clear_session_cookie, session_id_from_jar};
use super::error::AppError;
use super::routes::AppState;
use crate::crypto::PasswordHasher;
use crate::session::{Session, SessionRepository};
use crate::{AuthError, CredentialRepository, FailedAttemptRepository};

/// An authenticated admin session.
///
/// Extracting it runs the full session check (signature, fingerprint, idle
/// timeout, activity refresh). Any failure redirects to the login path and
/// clears the cookie; the client is not told which check failed.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

impl AdminSession {
    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn session(&self) -> &Session {
        &self.0
    }

    pub fn into_inner(self) -> Session {
        self.0
    }
}

impl<C, F, S, H> FromRequestParts<AppState<C, F, S, H>> for AdminSession
where
    C: CredentialRepository + 'static,
    F: FailedAttemptRepository + 'static,
    S: SessionRepository + 'static,
    H: PasswordHasher + 'static,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<C, F, S, H>,
    ) -> Result<Self, Self::Rejection> {
        let session_config = &state.config.session;
        let jar = CookieJar::from_headers(&parts.headers);
        let session_id = session_id_from_jar(&jar, session_config);
        let fingerprint = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        match state
            .authenticate
            .require_authenticated(session_id.as_deref(), fingerprint)
            .await
        {
            Ok(session) => Ok(Self(session)),
            Err(AuthError::Unauthenticated) => {
                let jar = jar.add(clear_session_cookie(session_config));
                Err((jar, Redirect::to(&session_config.login_path)).into_response())
            }
            Err(e) => Err(AppError(e).into_response()),
        }
    }
}

/// CSRF guard for state-changing admin handlers. Call it before any mutation.
///
/// ```rust,ignore
/// async fn delete_post(
///     State(state): State<AppState<C, F, S>>,
///     session: AdminSession,
///     Form(form): Form<CsrfForm>,
/// ) -> Result<Redirect, AppError> {
///     require_csrf(&state, &session, form.csrf_token.as_deref()).await?;
///     // ... mutate
/// }
/// ```
pub async fn require_csrf<C, F, S, H>(
    state: &AppState<C, F, S, H>,
    session: &AdminSession,
    supplied: Option<&str>,
) -> Result<(), AppError>
where
    C: CredentialRepository,
    F: FailedAttemptRepository,
    S: SessionRepository,
    H: PasswordHasher,
{
    state
        .csrf
        .require_valid_token(session.id(), supplied)
        .await
        .map_err(AppError)
}
