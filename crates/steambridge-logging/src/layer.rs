//! Tracing layer that forwards events to the host sink

use crate::sink::{LogRecord, LogSinkRegistry};
use std::fmt::Write as _;
use steambridge_core::LogLevel;
use tracing::field::{Field, Visit};
use tracing::subscriber::Interest;
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Tracing layer that hands each enabled event to a [`LogSinkRegistry`]
pub struct HostLoggingLayer {
    registry: &'static LogSinkRegistry,
}

impl HostLoggingLayer {
    /// Layer bound to the global registry
    pub fn new() -> Self {
        Self {
            registry: LogSinkRegistry::global(),
        }
    }

    pub fn with_registry(registry: &'static LogSinkRegistry) -> Self {
        Self { registry }
    }

    fn convert_level(level: &Level) -> LogLevel {
        match *level {
            Level::TRACE => LogLevel::Trace,
            Level::DEBUG => LogLevel::Debug,
            Level::INFO => LogLevel::Info,
            Level::WARN => LogLevel::Warn,
            Level::ERROR => LogLevel::Error,
        }
    }
}

impl Default for HostLoggingLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for HostLoggingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = Self::convert_level(metadata.level());
        if !self.registry.is_enabled(level) || !self.registry.has_sink() {
            return;
        }

        let mut collector = FieldCollector::default();
        event.record(&mut collector);
        let message = collector.finish();

        self.registry.emit(&LogRecord {
            level,
            target: metadata.target(),
            message: &message,
        });
    }

    // Level can change at runtime, so never let the callsite cache a verdict
    fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
        Interest::sometimes()
    }

    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        self.registry
            .is_enabled(Self::convert_level(metadata.level()))
    }
}

/// Collects the `message` field and renders the others as ` key=value`
///
/// Dispatcher events carry the call handle and kind as fields, so dropping
/// them would leave the host with messages like "call completed".
#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    fields: String,
}

impl FieldCollector {
    fn push_field(&mut self, name: &str, value: std::fmt::Arguments<'_>) {
        let _ = write!(self.fields, " {name}={value}");
    }

    fn finish(self) -> String {
        let mut out = self.message.unwrap_or_default();
        if out.is_empty() {
            out.push_str(self.fields.trim_start());
        } else {
            out.push_str(&self.fields);
        }
        out
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }
}

/// Install [`HostLoggingLayer`] as the global subscriber at `level`
///
/// Safe to call more than once. Later calls only update the level, since a
/// global subscriber can be set a single time per process.
pub fn init_logging(level: LogLevel) {
    use tracing_subscriber::prelude::*;

    LogSinkRegistry::global().set_level(level);
    let subscriber = tracing_subscriber::registry().with(HostLoggingLayer::new());
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!(%level, "global subscriber already installed, level updated");
    }
}
