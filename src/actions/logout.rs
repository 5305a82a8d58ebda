use chrono::Utc;

use crate::AuthError;
use crate::events::{AuthEvent, dispatch};
use crate::session::SessionRepository;

pub struct LogoutAction<S: SessionRepository> {
    sessions: S,
}

impl<S: SessionRepository> LogoutAction<S> {
    pub fn new(sessions: S) -> Self {
        LogoutAction { sessions }
    }

    /// Destroys the session, including its CSRF token. Calling it without a
    /// session, or twice, is not an error. Clearing the cookie is up to the
    /// HTTP layer.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "logout", skip_all, err)
    )]
    pub async fn execute(&self, session_id: Option<&str>) -> Result<(), AuthError> {
        let Some(session_id) = session_id else {
            return Ok(());
        };

        let user_id = self
            .sessions
            .load(session_id)
            .await?
            .map(|s| s.data.user_id);

        self.sessions.destroy(session_id).await?;

        if user_id.is_some() {
            log::info!(target: "vitrine_auth", "msg=\"logout\" user_id={user_id:?}");
            dispatch(AuthEvent::LogoutSucceeded {
                user_id,
                at: Utc::now(),
            })
            .await;
        }

        Ok(())
    }
}
