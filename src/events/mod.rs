//! Domain events fired by the authentication actions.
//!
//! If no listeners are registered, events are dropped.
//!
//! ```rust,ignore
//! use vitrine::register_event_listeners;
//! use vitrine::events::listeners::LoggingListener;
//!
//! register_event_listeners(|registry| {
//!     registry.listen(LoggingListener::new());
//! });
//! ```
//!
//! Implement [`Listener`] to forward events elsewhere, for example to alert
//! on [`AuthEvent::LoginBlocked`].

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::AuthEvent;
pub use listener::Listener;
pub use registry::{EventRegistry, dispatch, register_event_listeners};
