use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::AuthError;

use super::credential::{Credential, CredentialRepository, Role};

#[derive(Clone, Default)]
pub struct MockCredentialRepository {
    pub credentials: Arc<Mutex<Vec<Credential>>>,
    unavailable: Arc<AtomicBool>,
}

impl MockCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        let repo = Self::new();
        if let Ok(mut credentials) = repo.credentials.lock() {
            credentials.push(credential);
        }
        repo
    }

    /// Makes every subsequent call fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn guard(&self) -> Result<MutexGuard<'_, Vec<Credential>>, AuthError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::DatabaseError("credential store unavailable".to_owned()));
        }
        self.credentials
            .lock()
            .map_err(|_| AuthError::DatabaseError("Lock poisoned".to_owned()))
    }
}

#[async_trait]
impl CredentialRepository for MockCredentialRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, AuthError> {
        let credentials = self.guard()?;
        Ok(credentials.iter().find(|c| c.username == username).cloned())
    }

    async fn update_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), AuthError> {
        let mut credentials = self.guard()?;
        if let Some(credential) = credentials.iter_mut().find(|c| c.id == id) {
            credential.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn count_credentials(&self) -> Result<u64, AuthError> {
        let credentials = self.guard()?;
        Ok(u64::try_from(credentials.len()).unwrap_or(u64::MAX))
    }

    async fn create_credential(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<Credential, AuthError> {
        let mut credentials = self.guard()?;
        if credentials.iter().any(|c| c.username == username) {
            return Err(AuthError::DatabaseError(format!(
                "username '{username}' already taken"
            )));
        }

        let credential = Credential {
            id: i64::try_from(credentials.len()).unwrap_or(i64::MAX) + 1,
            username: username.to_owned(),
            password_hash: password_hash.to_owned(),
            role,
            last_login_at: None,
            created_at: Utc::now(),
        };
        credentials.push(credential.clone());
        drop(credentials);

        Ok(credential)
    }
}
