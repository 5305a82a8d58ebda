//! Authentication operations.
//!
//! Each action owns the repositories it needs and exposes one `execute`
//! method (or a small set of guards), so the HTTP layer and tests assemble
//! them the same way.

pub mod authenticate;
pub mod bootstrap_admin;
pub mod login;
pub mod logout;
pub mod prune_expired;

pub use authenticate::AuthenticateAction;
pub use bootstrap_admin::BootstrapAdminAction;
pub use login::{LoginAction, LoginOutcome};
pub use logout::LogoutAction;
pub use prune_expired::{PruneExpiredAction, PruneResult};
