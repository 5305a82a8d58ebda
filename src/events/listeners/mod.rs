//! Ready-made listeners: [`LoggingListener`] for the `log` facade and, with
//! the `tracing` feature, `TracingListener`.

mod logging;
#[cfg(feature = "tracing")]
mod tracing;

pub use logging::LoggingListener;
#[cfg(feature = "tracing")]
pub use self::tracing::TracingListener;
