//! File-based session storage.
//!
//! Stores sessions as JSON files in a directory.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use super::repository::SessionRepository;
use super::{SESSION_ID_LENGTH, Session, SessionData, TouchOutcome, evaluate_touch};
use crate::AuthError;
use crate::crypto::generate_token;

/// File-based session storage.
///
/// Each session is stored as a JSON file named `{session_id}.json` in the
/// configured directory. All operations take one async lock, so a
/// read-modify-write such as [`SessionRepository::touch`] is never
/// interleaved with another request in the same process.
///
/// # Example
///
/// ```rust,ignore
/// use vitrine::session::FileSessionRepository;
///
/// let repo = FileSessionRepository::new("/var/lib/vitrine/sessions")?;
/// ```
pub struct FileSessionRepository {
    directory: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionRepository {
    /// Creates the repository, creating the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let dir = directory.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            AuthError::DatabaseError(format!("Failed to create session directory: {e}"))
        })?;
        Ok(Self {
            directory: dir,
            lock: Mutex::new(()),
        })
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.directory.join(format!("{session_id}.json"))
    }

    /// Ids are generated alphanumeric; anything else could escape the directory.
    fn is_valid_id(session_id: &str) -> bool {
        !session_id.is_empty() && session_id.chars().all(|c| c.is_ascii_alphanumeric())
    }

    fn read_session(&self, session_id: &str) -> Result<Option<SessionData>, AuthError> {
        let path = self.session_path(session_id);

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| AuthError::DatabaseError(format!("Failed to read session file: {e}")))?;

        let data: SessionData = serde_json::from_str(&content)
            .map_err(|e| AuthError::DatabaseError(format!("Failed to parse session file: {e}")))?;

        Ok(Some(data))
    }

    /// Writes through a temporary file and a rename so readers never see a
    /// partial document.
    fn write_session(&self, session_id: &str, data: &SessionData) -> Result<(), AuthError> {
        let path = self.session_path(session_id);
        let tmp = self.directory.join(format!("{session_id}.json.tmp"));

        let content = serde_json::to_string_pretty(data)
            .map_err(|e| AuthError::DatabaseError(format!("Failed to serialize session: {e}")))?;

        std::fs::write(&tmp, content)
            .map_err(|e| AuthError::DatabaseError(format!("Failed to write session file: {e}")))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| AuthError::DatabaseError(format!("Failed to write session file: {e}")))?;

        Ok(())
    }

    fn remove_session(&self, session_id: &str) -> Result<(), AuthError> {
        let path = self.session_path(session_id);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| {
                AuthError::DatabaseError(format!("Failed to delete session file: {e}"))
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for FileSessionRepository {
    async fn create(&self, data: SessionData) -> Result<String, AuthError> {
        let _guard = self.lock.lock().await;

        let mut session_id = generate_token(SESSION_ID_LENGTH);
        while self.session_path(&session_id).exists() {
            session_id = generate_token(SESSION_ID_LENGTH);
        }
        self.write_session(&session_id, &data)?;
        Ok(session_id)
    }

    async fn load(&self, session_id: &str) -> Result<Option<Session>, AuthError> {
        if !Self::is_valid_id(session_id) {
            return Ok(None);
        }
        let _guard = self.lock.lock().await;

        Ok(self.read_session(session_id)?.map(|data| Session {
            id: session_id.to_owned(),
            data,
        }))
    }

    async fn save(&self, session_id: &str, data: SessionData) -> Result<(), AuthError> {
        if !Self::is_valid_id(session_id) {
            return Ok(());
        }
        let _guard = self.lock.lock().await;

        if self.session_path(session_id).exists() {
            self.write_session(session_id, &data)?;
        }
        Ok(())
    }

    async fn destroy(&self, session_id: &str) -> Result<(), AuthError> {
        if !Self::is_valid_id(session_id) {
            return Ok(());
        }
        let _guard = self.lock.lock().await;
        self.remove_session(session_id)
    }

    async fn touch(
        &self,
        session_id: &str,
        fingerprint: &str,
        idle_timeout: Duration,
    ) -> Result<TouchOutcome, AuthError> {
        if !Self::is_valid_id(session_id) {
            return Ok(TouchOutcome::Missing);
        }
        let _guard = self.lock.lock().await;

        let Some(mut data) = self.read_session(session_id)? else {
            return Ok(TouchOutcome::Missing);
        };

        match evaluate_touch(&mut data, fingerprint, idle_timeout, Utc::now()) {
            Ok(()) => {
                self.write_session(session_id, &data)?;
                Ok(TouchOutcome::Active(Session::new(session_id.to_owned(), data)))
            }
            Err(outcome) => {
                self.remove_session(session_id)?;
                Ok(outcome)
            }
        }
    }

    async fn set_csrf_token(&self, session_id: &str, token: &str) -> Result<bool, AuthError> {
        if !Self::is_valid_id(session_id) {
            return Ok(false);
        }
        let _guard = self.lock.lock().await;

        let Some(mut data) = self.read_session(session_id)? else {
            return Ok(false);
        };
        data.csrf_token = Some(token.to_owned());
        self.write_session(session_id, &data)?;
        Ok(true)
    }

    async fn prune_idle(&self, idle_timeout: Duration) -> Result<u64, AuthError> {
        let _guard = self.lock.lock().await;

        let entries = std::fs::read_dir(&self.directory).map_err(|e| {
            AuthError::DatabaseError(format!("Failed to read session directory: {e}"))
        })?;

        let now = Utc::now();
        let mut pruned = 0u64;

        for entry in entries.flatten() {
            let path = entry.path();

            if path.extension().is_some_and(|ext| ext == "json") {
                if let Ok(content) = std::fs::read_to_string(&path) {
                    if let Ok(data) = serde_json::from_str::<SessionData>(&content) {
                        if data.is_idle(idle_timeout, now) && std::fs::remove_file(&path).is_ok()
                        {
                            pruned += 1;
                        }
                    }
                }
            }
        }

        Ok(pruned)
    }
}
