//! First-run creation of the administrator account.

use chrono::Utc;

use crate::AuthError;
use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::events::{AuthEvent, dispatch};
use crate::repository::{Credential, CredentialRepository, Role};
use crate::validators::{PasswordPolicy, validate_password_confirmation, validate_username};

pub struct BootstrapAdminAction<C: CredentialRepository, H: PasswordHasher = Argon2Hasher> {
    credentials: C,
    hasher: H,
    policy: PasswordPolicy,
}

impl<C: CredentialRepository> BootstrapAdminAction<C> {
    pub fn new(credentials: C) -> Self {
        Self {
            credentials,
            hasher: Argon2Hasher::default(),
            policy: PasswordPolicy::default(),
        }
    }
}

impl<C: CredentialRepository, H: PasswordHasher> BootstrapAdminAction<C, H> {
    pub fn with_hasher<H2: PasswordHasher>(self, hasher: H2) -> BootstrapAdminAction<C, H2> {
        BootstrapAdminAction {
            credentials: self.credentials,
            hasher,
            policy: self.policy,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Creates the administrator if no credential exists yet.
    ///
    /// Inputs are trimmed before checking.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty field, a bad username, a policy failure
    ///   or a confirmation mismatch
    /// - `AdminAlreadyExists` when any credential is already stored
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "bootstrap_admin", skip_all, err)
    )]
    pub async fn execute(
        &self,
        username: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<Credential, AuthError> {
        let username = username.trim();
        let password = password.trim();
        let confirmation = confirmation.trim();

        validate_username(username)?;
        self.policy.validate(password)?;
        validate_password_confirmation(password, confirmation)?;

        if self.credentials.count_credentials().await? > 0 {
            log::warn!(target: "vitrine_auth", "msg=\"bootstrap refused, credentials exist\"");
            return Err(AuthError::AdminAlreadyExists);
        }

        let hash = self.hasher.hash(password)?;
        let credential = self
            .credentials
            .create_credential(username, &hash, Role::Admin)
            .await?;

        log::info!(
            target: "vitrine_auth",
            "msg=\"administrator created\" user_id={}",
            credential.id
        );
        dispatch(AuthEvent::AdminBootstrapped {
            user_id: credential.id,
            username: credential.username.clone(),
            at: Utc::now(),
        })
        .await;

        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::fast_hasher;
    use crate::repository::MockCredentialRepository;

    fn action(repo: &MockCredentialRepository) -> BootstrapAdminAction<MockCredentialRepository, Argon2Hasher> {
        BootstrapAdminAction::new(repo.clone()).with_hasher(fast_hasher())
    }

    #[tokio::test]
    async fn test_creates_admin() {
        let repo = MockCredentialRepository::new();
        let credential = action(&repo)
            .execute("  admin ", "long enough pw", "long enough pw")
            .await
            .unwrap();

        assert_eq!(credential.username, "admin");
        assert_eq!(credential.role, Role::Admin);
        assert!(fast_hasher().verify("long enough pw", &credential.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_refuses_second_admin() {
        let repo = MockCredentialRepository::new();
        action(&repo).execute("admin", "password1", "password1").await.unwrap();

        let second = action(&repo).execute("other", "password2", "password2").await;
        assert_eq!(second.unwrap_err(), AuthError::AdminAlreadyExists);
        assert_eq!(repo.count_credentials().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_validation_failures() {
        let repo = MockCredentialRepository::new();
        let a = action(&repo);

        for (user, pw, confirm) in [
            ("", "password1", "password1"),
            ("admin", "", ""),
            ("admin", "short", "short"),
            ("admin", "password1", "password2"),
        ] {
            let result = a.execute(user, pw, confirm).await;
            assert!(matches!(result, Err(AuthError::Validation(_))), "{user}/{pw}/{confirm}");
        }
        assert_eq!(repo.count_credentials().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_failure() {
        let repo = MockCredentialRepository::new();
        repo.set_unavailable(true);
        let result = action(&repo).execute("admin", "password1", "password1").await;
        assert!(matches!(result, Err(AuthError::DatabaseError(_))));
    }
}
