use async_trait::async_trait;

use crate::events::{AuthEvent, Listener};

/// Emits authentication events as tracing events.
///
/// Requires the `tracing` feature to be enabled.
pub struct TracingListener;

#[async_trait]
impl Listener for TracingListener {
    async fn handle(&self, event: &AuthEvent) {
        if event.is_security_relevant() {
            tracing::warn!(
                target: "vitrine::events",
                event_name = event.name(),
                ?event,
                "auth event"
            );
        } else {
            tracing::info!(
                target: "vitrine::events",
                event_name = event.name(),
                ?event,
                "auth event"
            );
        }
    }
}
