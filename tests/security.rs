//! Security properties of the admin authentication core.
//!
//! Run with: `cargo test --features mocks --test security`

#![cfg(feature = "mocks")]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use chrono::{Duration, Utc};
use vitrine::actions::{AuthenticateAction, LoginAction, LogoutAction};
use vitrine::config::{CsrfConfig, RateLimitConfig};
use vitrine::crypto::{Argon2Hasher, PasswordHasher, hash_password};
use vitrine::csrf::CsrfProtection;
use vitrine::rate_limit::RateLimiter;
use vitrine::session::{InMemorySessionRepository, SessionData, SessionRepository};
use vitrine::{
    AuthConfig, AuthError, ClientInfo, Credential, MockCredentialRepository,
    MockFailedAttemptRepository, SecretString,
};

const ADDRESS: &str = "198.51.100.23";
const USER_AGENT: &str = "Mozilla/5.0 (security suite)";
const PASSWORD: &str = "correct horse battery";

fn fast_hasher() -> Argon2Hasher {
    Argon2Hasher::new(1024, 1, 1)
}

fn client() -> ClientInfo {
    ClientInfo::new(ADDRESS, USER_AGENT)
}

fn seed_failures(attempts: &MockFailedAttemptRepository, address: &str, count: u32) {
    for _ in 0..count {
        attempts.push_at(Some("admin"), address, Utc::now());
    }
}

struct Harness {
    login: LoginAction<
        MockCredentialRepository,
        MockFailedAttemptRepository,
        InMemorySessionRepository,
        Argon2Hasher,
    >,
    credentials: MockCredentialRepository,
    attempts: MockFailedAttemptRepository,
    sessions: InMemorySessionRepository,
}

fn harness() -> Harness {
    let hash = fast_hasher().hash(PASSWORD).unwrap();
    let credentials =
        MockCredentialRepository::with_credential(Credential::mock_from_credentials("admin", &hash));
    let attempts = MockFailedAttemptRepository::new();
    let sessions = InMemorySessionRepository::new();
    let login = LoginAction::new(
        credentials.clone(),
        attempts.clone(),
        sessions.clone(),
        &AuthConfig::default(),
    )
    .with_hasher(fast_hasher());

    Harness {
        login,
        credentials,
        attempts,
        sessions,
    }
}

// =============================================================================
// Password hashing
// =============================================================================

#[test]
fn password_hashes_are_argon2id_and_salted() {
    let first = hash_password("hunter22hunter22").unwrap();
    let second = hash_password("hunter22hunter22").unwrap();

    assert!(first.starts_with("$argon2id$"));
    assert_ne!(first, second);
    assert!(Argon2Hasher::default().verify("hunter22hunter22", &first).unwrap());
}

#[test]
fn secret_string_never_prints_its_value() {
    let secret = SecretString::new("admin-password");
    assert!(!format!("{secret:?}").contains("admin-password"));
    assert!(!format!("{secret}").contains("admin-password"));
}

// =============================================================================
// Rate limiter policy
// =============================================================================

#[tokio::test]
async fn below_threshold_is_allowed_without_delay() {
    let attempts = MockFailedAttemptRepository::new();
    let limiter = RateLimiter::new(attempts.clone(), RateLimitConfig::default());

    for count in 0..10 {
        let decision = limiter.check_rate_limit(ADDRESS).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.attempt_count, count);
        assert_eq!(decision.delay_ms, 0);
        seed_failures(&attempts, ADDRESS, 1);
    }
}

#[tokio::test]
async fn delay_doubles_between_threshold_and_hard_limit() {
    let attempts = MockFailedAttemptRepository::new();
    let limiter = RateLimiter::new(attempts.clone(), RateLimitConfig::default());
    seed_failures(&attempts, ADDRESS, 10);

    let mut previous = 0;
    for count in 10..20u32 {
        let decision = limiter.check_rate_limit(ADDRESS).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.delay_ms, 2u64.pow(count - 10) * 100);
        assert!(decision.delay_ms > previous);
        previous = decision.delay_ms;
        seed_failures(&attempts, ADDRESS, 1);
    }

    let decision = limiter.check_rate_limit(ADDRESS).await.unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.attempt_count, 20);
}

#[tokio::test]
async fn escalation_scenario() {
    let attempts = MockFailedAttemptRepository::new();
    let limiter = RateLimiter::new(attempts.clone(), RateLimitConfig::default());

    seed_failures(&attempts, ADDRESS, 10);
    assert_eq!(limiter.check_rate_limit(ADDRESS).await.unwrap().delay_ms, 100);

    seed_failures(&attempts, ADDRESS, 1);
    assert_eq!(limiter.check_rate_limit(ADDRESS).await.unwrap().delay_ms, 200);

    seed_failures(&attempts, ADDRESS, 9);
    assert!(!limiter.check_rate_limit(ADDRESS).await.unwrap().allowed);
}

#[tokio::test]
async fn attempts_outside_window_do_not_count() {
    let attempts = MockFailedAttemptRepository::new();
    let limiter = RateLimiter::new(attempts.clone(), RateLimitConfig::default());
    for _ in 0..25 {
        attempts.push_at(None, ADDRESS, Utc::now() - Duration::seconds(901));
    }

    let decision = limiter.check_rate_limit(ADDRESS).await.unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.attempt_count, 0);

    assert_eq!(limiter.cleanup_old_records().await.unwrap(), 25);
    assert!(attempts.is_empty());
}

#[tokio::test]
async fn limits_are_per_address_and_ipv6_aware() {
    let attempts = MockFailedAttemptRepository::new();
    let limiter = RateLimiter::new(attempts.clone(), RateLimitConfig::default());

    for _ in 0..20 {
        limiter
            .record_failed_attempt(Some("admin"), "2001:0db8:0000:0000:0000:0000:0000:0001")
            .await
            .unwrap();
    }

    assert!(!limiter.check_rate_limit("2001:db8::1").await.unwrap().allowed);
    assert!(limiter.check_rate_limit("2001:db8::2").await.unwrap().allowed);
    assert!(limiter.check_rate_limit(ADDRESS).await.unwrap().allowed);
}

#[tokio::test]
async fn unparseable_address_is_denied() {
    let limiter = RateLimiter::new(MockFailedAttemptRepository::new(), RateLimitConfig::default());
    assert_eq!(
        limiter.check_rate_limit("not-an-ip").await,
        Err(AuthError::InvalidAddress)
    );
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn hard_limit_blocks_even_correct_password() {
    let h = harness();
    seed_failures(&h.attempts, ADDRESS, 20);

    let result = h.login.execute("admin", PASSWORD, &client(), None).await;

    assert_eq!(result.err(), Some(AuthError::TooManyAttempts));
    assert!(h.sessions.is_empty());
    assert_eq!(h.attempts.len(), 20);
}

#[tokio::test]
async fn lockout_reads_like_a_wrong_password() {
    assert_eq!(
        AuthError::TooManyAttempts.public_message(),
        AuthError::InvalidCredentials.public_message()
    );
}

#[tokio::test]
async fn success_after_failures_resets_counter() {
    let h = harness();
    for _ in 0..3 {
        let result = h.login.execute("admin", "wrong", &client(), None).await;
        assert_eq!(result.err(), Some(AuthError::InvalidCredentials));
    }
    assert_eq!(h.attempts.len(), 3);

    h.login
        .execute("admin", PASSWORD, &client(), None)
        .await
        .unwrap();

    let decision = h.login.limiter().check_rate_limit(ADDRESS).await.unwrap();
    assert_eq!(decision.attempt_count, 0);
}

#[tokio::test]
async fn unknown_user_is_recorded_and_generic() {
    let h = harness();

    let unknown = h.login.execute("ghost", PASSWORD, &client(), None).await;
    let wrong = h.login.execute("admin", "wrong", &client(), None).await;

    assert_eq!(unknown.err(), Some(AuthError::InvalidCredentials));
    assert_eq!(wrong.err(), Some(AuthError::InvalidCredentials));

    let recorded = h.attempts.attempts.lock().unwrap().clone();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].username.as_deref(), Some("ghost"));
    assert_eq!(recorded[0].ip_address, ADDRESS);
}

#[tokio::test]
async fn login_issues_fresh_session_id() {
    let h = harness();
    let planted = h
        .sessions
        .create(SessionData::for_credential(
            &Credential::mock_from_credentials("admin", "x"),
            USER_AGENT,
            ADDRESS,
        ))
        .await
        .unwrap();

    let first = h
        .login
        .execute("admin", PASSWORD, &client(), Some(&planted))
        .await
        .unwrap();
    let second = h
        .login
        .execute("admin", PASSWORD, &client(), Some(&first.session.id))
        .await
        .unwrap();

    assert_ne!(first.session.id, planted);
    assert_ne!(second.session.id, first.session.id);
    assert!(h.sessions.load(&planted).await.unwrap().is_none());
    assert!(h.sessions.load(&first.session.id).await.unwrap().is_none());
    assert_eq!(h.sessions.len(), 1);
}

#[tokio::test]
async fn unreachable_ledger_fails_closed() {
    let h = harness();
    h.attempts.set_unavailable(true);

    let result = h.login.execute("admin", PASSWORD, &client(), None).await;

    assert!(matches!(result, Err(AuthError::DatabaseError(_))));
    assert!(h.sessions.is_empty());
}

#[tokio::test]
async fn unreachable_credential_store_fails_closed() {
    let h = harness();
    h.credentials.set_unavailable(true);

    let result = h.login.execute("admin", PASSWORD, &client(), None).await;

    assert!(result.is_err());
    assert!(h.sessions.is_empty());
}

// =============================================================================
// Session integrity
// =============================================================================

#[tokio::test]
async fn replay_from_other_user_agent_destroys_session() {
    let h = harness();
    let outcome = h
        .login
        .execute("admin", PASSWORD, &client(), None)
        .await
        .unwrap();
    let auth = AuthenticateAction::new(h.sessions.clone(), Duration::seconds(3600));

    assert!(
        !auth
            .is_authenticated(Some(&outcome.session.id), "curl/8.5.0")
            .await
    );
    assert!(h.sessions.load(&outcome.session.id).await.unwrap().is_none());
    assert!(
        !auth
            .is_authenticated(Some(&outcome.session.id), USER_AGENT)
            .await
    );
}

#[tokio::test]
async fn idle_session_expires_even_with_matching_fingerprint() {
    let sessions = InMemorySessionRepository::new();
    let mut data = SessionData::for_credential(
        &Credential::mock_from_credentials("admin", "x"),
        USER_AGENT,
        ADDRESS,
    );
    data.last_activity = Utc::now() - Duration::seconds(3601);
    let id = sessions.create(data).await.unwrap();
    let auth = AuthenticateAction::new(sessions.clone(), Duration::seconds(3600));

    assert_eq!(
        auth.require_authenticated(Some(&id), USER_AGENT).await.err(),
        Some(AuthError::Unauthenticated)
    );
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn activity_refreshes_idle_clock() {
    let sessions = InMemorySessionRepository::new();
    let mut data = SessionData::for_credential(
        &Credential::mock_from_credentials("admin", "x"),
        USER_AGENT,
        ADDRESS,
    );
    data.last_activity = Utc::now() - Duration::seconds(3500);
    let id = sessions.create(data).await.unwrap();
    let auth = AuthenticateAction::new(sessions.clone(), Duration::seconds(3600));

    let session = auth.require_authenticated(Some(&id), USER_AGENT).await.unwrap();
    assert!(Utc::now() - session.data.last_activity < Duration::seconds(5));
}

#[tokio::test]
async fn logout_is_idempotent() {
    let h = harness();
    let outcome = h
        .login
        .execute("admin", PASSWORD, &client(), None)
        .await
        .unwrap();
    let logout = LogoutAction::new(h.sessions.clone());

    logout.execute(Some(&outcome.session.id)).await.unwrap();
    logout.execute(Some(&outcome.session.id)).await.unwrap();
    logout.execute(None).await.unwrap();
    assert!(h.sessions.is_empty());
}

// =============================================================================
// CSRF
// =============================================================================

#[tokio::test]
async fn csrf_validation_rejects_every_mismatch() {
    let sessions = InMemorySessionRepository::new();
    let id = sessions
        .create(SessionData::for_credential(
            &Credential::mock_from_credentials("admin", "x"),
            USER_AGENT,
            ADDRESS,
        ))
        .await
        .unwrap();
    let csrf = CsrfProtection::new(sessions.clone(), CsrfConfig::default());

    assert!(!csrf.validate_token(&id, Some("anything")).await);

    let token = csrf.generate_token(&id).await.unwrap();
    assert!(!csrf.validate_token(&id, None).await);
    assert!(!csrf.validate_token(&id, Some("")).await);

    let mut tampered = token.clone().into_bytes();
    let last = tampered.len() - 1;
    tampered[last] = if tampered[last] == b'0' { b'1' } else { b'0' };
    let tampered = String::from_utf8(tampered).unwrap();
    assert!(!csrf.validate_token(&id, Some(&tampered)).await);

    assert!(csrf.validate_token(&id, Some(&token)).await);
    assert!(!csrf.validate_token("unknown-session", Some(&token)).await);
}

#[tokio::test]
async fn regenerated_csrf_token_invalidates_old_one() {
    let sessions = InMemorySessionRepository::new();
    let id = sessions
        .create(SessionData::for_credential(
            &Credential::mock_from_credentials("admin", "x"),
            USER_AGENT,
            ADDRESS,
        ))
        .await
        .unwrap();
    let csrf = CsrfProtection::new(sessions, CsrfConfig::default());

    let old = csrf.generate_token(&id).await.unwrap();
    assert!(csrf.validate_token(&id, Some(&old)).await);
    assert!(csrf.validate_token(&id, Some(&old)).await, "tokens are not single-use");

    let new = csrf.generate_token(&id).await.unwrap();
    assert_ne!(old, new);
    assert!(!csrf.validate_token(&id, Some(&old)).await);
    assert!(csrf.validate_token(&id, Some(&new)).await);
}

#[tokio::test]
async fn csrf_rejection_is_an_error_value() {
    let sessions = InMemorySessionRepository::new();
    let id = sessions
        .create(SessionData::for_credential(
            &Credential::mock_from_credentials("admin", "x"),
            USER_AGENT,
            ADDRESS,
        ))
        .await
        .unwrap();
    let csrf = CsrfProtection::new(sessions, CsrfConfig::default());
    csrf.generate_token(&id).await.unwrap();

    assert_eq!(
        csrf.require_valid_token(&id, Some("forged")).await,
        Err(AuthError::CsrfRejected)
    );
}
