//! HTTP handlers for the admin authentication endpoints.

use std::time::Duration;

use axum::Json;
use axum::extract::{Form, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use chrono::Utc;

use super::cookies::{
    clear_login_csrf_cookie, clear_session_cookie, login_csrf_cookie, session_cookie,
    session_id_from_jar,
};
use super::error::AppError;
use super::middleware::{AdminSession, require_csrf};
use super::routes::AppState;
use crate::api::{CsrfForm, HONEYPOT_FIELD, LoginForm, LoginPageResponse, SessionResponse};
use crate::client::ClientInfo;
use crate::crypto::PasswordHasher;
use crate::events::{AuthEvent, dispatch};
use crate::session::{SessionRepository, sign_session_id};
use crate::{AuthError, CredentialRepository, FailedAttemptRepository};

/// How long a request that filled the honeypot is held before the reply.
const HONEYPOT_DELAY: Duration = Duration::from_secs(2);

/// Login form data. Already-authenticated visitors go to the dashboard.
///
/// GET /login
pub async fn login_page<C, F, S, H>(
    State(state): State<AppState<C, F, S, H>>,
    client: ClientInfo,
    jar: CookieJar,
) -> Response
where
    C: CredentialRepository + 'static,
    F: FailedAttemptRepository + 'static,
    S: SessionRepository + 'static,
    H: PasswordHasher + 'static,
{
    let session_id = session_id_from_jar(&jar, &state.config.session);
    if state
        .authenticate
        .is_authenticated(session_id.as_deref(), &client.fingerprint)
        .await
    {
        return Redirect::to(&state.config.session.dashboard_path).into_response();
    }

    let issued = state.login_csrf.issue();
    let jar = jar.add(login_csrf_cookie(&state.config, issued.cookie_value));

    (
        jar,
        Json(LoginPageResponse {
            field_name: state.login_csrf.field_name().to_owned(),
            csrf_token: issued.token,
            honeypot_field: HONEYPOT_FIELD,
        }),
    )
        .into_response()
}

/// Authenticates and starts a session.
///
/// POST /login
pub async fn login<C, F, S, H>(
    State(state): State<AppState<C, F, S, H>>,
    client: ClientInfo,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError>
where
    C: CredentialRepository + 'static,
    F: FailedAttemptRepository + 'static,
    S: SessionRepository + 'static,
    H: PasswordHasher + 'static,
{
    let csrf_cookie = jar
        .get(state.login_csrf.cookie_name())
        .map(|c| c.value().to_owned());
    if !state
        .login_csrf
        .validate(csrf_cookie.as_deref(), form.csrf_token.as_deref())
    {
        log::warn!(target: "vitrine_auth::csrf", "msg=\"login form csrf rejected\" address=\"{}\"", client.address);
        dispatch(AuthEvent::CsrfRejected { at: Utc::now() }).await;
        return Err(AppError(AuthError::CsrfRejected));
    }

    if form.is_bot() {
        log::warn!(target: "vitrine_auth", "msg=\"honeypot triggered\" address=\"{}\"", client.address);
        tokio::time::sleep(HONEYPOT_DELAY).await;
        return Err(AppError(AuthError::InvalidCredentials));
    }

    let previous = session_id_from_jar(&jar, &state.config.session);
    let outcome = state
        .login
        .execute(
            &form.username,
            form.password.expose_secret(),
            &client,
            previous.as_deref(),
        )
        .await?;

    let signed = sign_session_id(&outcome.session.id, &state.config.session.secret_key);
    let jar = jar
        .add(session_cookie(&state.config.session, signed))
        .add(clear_login_csrf_cookie(&state.config));

    Ok((jar, Redirect::to(&state.config.session.dashboard_path)).into_response())
}

/// Ends the session and clears the cookie.
///
/// POST /logout
pub async fn logout<C, F, S, H>(
    State(state): State<AppState<C, F, S, H>>,
    session: AdminSession,
    jar: CookieJar,
    Form(form): Form<CsrfForm>,
) -> Result<Response, AppError>
where
    C: CredentialRepository + 'static,
    F: FailedAttemptRepository + 'static,
    S: SessionRepository + 'static,
    H: PasswordHasher + 'static,
{
    require_csrf(&state, &session, form.csrf_token.as_deref()).await?;
    state.logout.execute(Some(session.id())).await?;

    let jar = jar.add(clear_session_cookie(&state.config.session));
    Ok((jar, Redirect::to(&state.config.session.login_path)).into_response())
}

/// The current admin and the CSRF token to embed in forms.
///
/// GET /session
pub async fn current_session<C, F, S, H>(
    State(state): State<AppState<C, F, S, H>>,
    session: AdminSession,
) -> Result<Json<SessionResponse>, AppError>
where
    C: CredentialRepository + 'static,
    F: FailedAttemptRepository + 'static,
    S: SessionRepository + 'static,
    H: PasswordHasher + 'static,
{
    let token = state.csrf.get_or_create_token(session.id()).await?;
    Ok(Json(SessionResponse::new(session.session(), token)))
}
