use chrono::Utc;

use crate::AuthError;
use crate::client::ClientInfo;
use crate::config::AuthConfig;
use crate::crypto::{Argon2Hasher, PasswordHasher, generate_hex_token};
use crate::events::{AuthEvent, dispatch};
use crate::rate_limit::RateLimiter;
use crate::repository::{Credential, CredentialRepository, FailedAttemptRepository};
use crate::session::{Session, SessionData, SessionRepository};

/// A verified login: the new session and the account it belongs to.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session: Session,
    pub credential: Credential,
}

/// Username/password login behind the per-address rate limiter.
///
/// Order of work for one attempt:
///
/// 1. ask the limiter; a refusal or a limiter error ends the attempt before
///    any credential lookup
/// 2. wait out the throttle delay, if any
/// 3. look up the credential; for an unknown username a dummy hash is
///    verified so the attempt costs the same
/// 4. verify the password; every failure is recorded against the address
/// 5. on success destroy the pre-login session id, create a new session
///    with a fresh CSRF token, stamp last-login and clear the address
pub struct LoginAction<C, F, S, H = Argon2Hasher>
where
    C: CredentialRepository,
    F: FailedAttemptRepository,
    S: SessionRepository,
    H: PasswordHasher,
{
    credentials: C,
    limiter: RateLimiter<F>,
    sessions: S,
    hasher: H,
    csrf_token_bytes: usize,
}

impl<C, F, S> LoginAction<C, F, S, Argon2Hasher>
where
    C: CredentialRepository,
    F: FailedAttemptRepository,
    S: SessionRepository,
{
    pub fn new(credentials: C, attempts: F, sessions: S, config: &AuthConfig) -> Self {
        Self {
            credentials,
            limiter: RateLimiter::new(attempts, config.rate_limit.clone()),
            sessions,
            hasher: Argon2Hasher::default(),
            csrf_token_bytes: config.csrf.token_bytes,
        }
    }
}

impl<C, F, S, H> LoginAction<C, F, S, H>
where
    C: CredentialRepository,
    F: FailedAttemptRepository,
    S: SessionRepository,
    H: PasswordHasher,
{
    /// Swaps the password hasher. Only the dummy-hash cost depends on it;
    /// stored hashes carry their own parameters, so the hasher should use
    /// the same parameters the credentials were hashed with.
    pub fn with_hasher<H2: PasswordHasher>(self, hasher: H2) -> LoginAction<C, F, S, H2> {
        LoginAction {
            credentials: self.credentials,
            limiter: self.limiter,
            sessions: self.sessions,
            hasher,
            csrf_token_bytes: self.csrf_token_bytes,
        }
    }

    pub fn limiter(&self) -> &RateLimiter<F> {
        &self.limiter
    }

    /// Attempts a login.
    ///
    /// `previous_session_id` is whatever session cookie the client sent; it
    /// is destroyed on success so a planted id never becomes authenticated.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` for an unknown user or a wrong password
    /// - `TooManyAttempts` when the address reached the hard limit
    /// - `InvalidAddress`, `DatabaseError`, `PasswordHashError` on backend
    ///   or input failures; the login is denied in every case
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "login", skip_all, err)
    )]
    pub async fn execute(
        &self,
        username: &str,
        password: &str,
        client: &ClientInfo,
        previous_session_id: Option<&str>,
    ) -> Result<LoginOutcome, AuthError> {
        let address = client.address.as_str();

        let decision = self.limiter.check_rate_limit(address).await.map_err(|e| {
            log::error!(target: "vitrine_auth", "msg=\"rate limit check failed, denying\" address=\"{address}\" error=\"{e}\"");
            e
        })?;

        if !decision.is_allowed() {
            log::warn!(
                target: "vitrine_auth",
                "msg=\"login blocked\" address=\"{address}\" attempts={}",
                decision.attempt_count
            );
            dispatch(AuthEvent::LoginBlocked {
                address: address.to_owned(),
                attempts: decision.attempt_count,
                at: Utc::now(),
            })
            .await;
            return Err(AuthError::TooManyAttempts);
        }

        if decision.is_throttled() {
            log::info!(
                target: "vitrine_auth",
                "msg=\"login throttled\" address=\"{address}\" attempts={} delay_ms={}",
                decision.attempt_count,
                decision.delay_ms
            );
            dispatch(AuthEvent::LoginThrottled {
                address: address.to_owned(),
                delay_ms: decision.delay_ms,
                at: Utc::now(),
            })
            .await;
            self.limiter.apply_delay(decision.delay_ms).await;
        }

        let Some(credential) = self.credentials.find_by_username(username).await? else {
            self.hasher.verify_dummy(password);
            self.fail(username, address, "unknown_user").await?;
            return Err(AuthError::InvalidCredentials);
        };

        let verified = match self.hasher.verify(password, &credential.password_hash) {
            Ok(verified) => verified,
            Err(e) => {
                log::error!(target: "vitrine_auth", "msg=\"stored hash unreadable\" user_id={} error=\"{e}\"", credential.id);
                self.fail(username, address, "hash_error").await?;
                return Err(e);
            }
        };

        if !verified {
            self.fail(username, address, "wrong_password").await?;
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.start_session(&credential, client, previous_session_id).await?;

        log::info!(
            target: "vitrine_auth",
            "msg=\"login succeeded\" user_id={} address=\"{address}\"",
            credential.id
        );
        dispatch(AuthEvent::LoginSucceeded {
            user_id: credential.id,
            username: credential.username.clone(),
            address: address.to_owned(),
            at: Utc::now(),
        })
        .await;

        Ok(LoginOutcome {
            session,
            credential,
        })
    }

    async fn fail(&self, username: &str, address: &str, reason: &str) -> Result<(), AuthError> {
        log::info!(
            target: "vitrine_auth",
            "msg=\"login failed\" reason={reason} address=\"{address}\""
        );
        let recorded_name = (!username.is_empty()).then_some(username);
        self.limiter
            .record_failed_attempt(recorded_name, address)
            .await?;
        dispatch(AuthEvent::LoginFailed {
            username: username.to_owned(),
            address: address.to_owned(),
            reason: reason.to_owned(),
            at: Utc::now(),
        })
        .await;
        Ok(())
    }

    async fn start_session(
        &self,
        credential: &Credential,
        client: &ClientInfo,
        previous_session_id: Option<&str>,
    ) -> Result<Session, AuthError> {
        if let Some(previous) = previous_session_id {
            self.sessions.destroy(previous).await?;
        }

        let mut data = SessionData::for_credential(credential, &client.fingerprint, &client.address);
        data.csrf_token = Some(generate_hex_token(self.csrf_token_bytes));
        let session_id = self.sessions.create(data.clone()).await?;

        let finish = async {
            self.credentials
                .update_last_login(credential.id, data.created_at)
                .await?;
            self.limiter.reset_attempts(&client.address).await
        };

        if let Err(e) = finish.await {
            log::error!(target: "vitrine_auth", "msg=\"login bookkeeping failed, discarding session\" error=\"{e}\"");
            if let Err(destroy_err) = self.sessions.destroy(&session_id).await {
                log::error!(target: "vitrine_auth", "msg=\"failed to discard session\" error=\"{destroy_err}\"");
            }
            return Err(e);
        }

        Ok(Session::new(session_id, data))
    }
}
