use async_trait::async_trait;

use super::AuthEvent;

/// Handles authentication events asynchronously.
///
/// # Example
///
/// ```rust,ignore
/// use vitrine::events::{AuthEvent, Listener};
/// use async_trait::async_trait;
///
/// struct LockoutAlertListener;
///
/// #[async_trait]
/// impl Listener for LockoutAlertListener {
///     async fn handle(&self, event: &AuthEvent) {
///         if let AuthEvent::LoginBlocked { address, attempts, .. } = event {
///             // page the operator
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Called for every dispatched event; filter by matching on the variant.
    async fn handle(&self, event: &AuthEvent);
}
