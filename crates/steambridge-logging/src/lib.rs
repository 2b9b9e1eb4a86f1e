//! steambridge-logging - Tracing to host log sink bridge
//!
//! The embedding application usually has its own logger. This crate forwards
//! `tracing` events from every steambridge crate into it:
//! - [`LogSinkRegistry`] holds the host sink and the active level
//! - [`HostLoggingLayer`] is the `tracing_subscriber` layer doing the forwarding
//! - [`init_logging`] installs the layer as the global subscriber

mod layer;
mod sink;

pub use layer::{HostLoggingLayer, init_logging};
pub use sink::{HostLogSink, LogRecord, LogSinkRegistry};
pub use steambridge_core::LogLevel;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{HostLogSink, HostLoggingLayer, LogLevel, LogSinkRegistry, init_logging};
}
