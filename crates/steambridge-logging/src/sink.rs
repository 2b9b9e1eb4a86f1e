//! Host log sink registration

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use steambridge_core::LogLevel;

/// One formatted log event handed to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord<'a> {
    pub level: LogLevel,
    /// Module path the event came from
    pub target: &'a str,
    /// Message followed by any structured fields as `key=value`
    pub message: &'a str,
}

/// Host function receiving log records
///
/// Called synchronously on whichever thread emitted the event, which for
/// dispatcher events is the thread calling `pump`.
pub type HostLogSink = Arc<dyn Fn(&LogRecord<'_>) + Send + Sync>;

static REGISTRY: OnceCell<LogSinkRegistry> = OnceCell::new();

/// Current host sink and level threshold
pub struct LogSinkRegistry {
    sink: RwLock<Option<HostLogSink>>,
    level: AtomicU8,
}

impl LogSinkRegistry {
    pub fn new() -> Self {
        Self {
            sink: RwLock::new(None),
            level: AtomicU8::new(LogLevel::Info as u8),
        }
    }

    /// The process-wide registry used by [`init_logging`](crate::init_logging)
    pub fn global() -> &'static LogSinkRegistry {
        REGISTRY.get_or_init(LogSinkRegistry::new)
    }

    /// Install or replace the host sink
    pub fn set_sink(&self, sink: HostLogSink) {
        *self.sink.write() = Some(sink);
    }

    /// Stop forwarding; events are dropped until a new sink is set
    pub fn clear_sink(&self) {
        *self.sink.write() = None;
    }

    pub fn has_sink(&self) -> bool {
        self.sink.read().is_some()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::SeqCst);
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::SeqCst))
    }

    /// `Off` disables everything, including `Error`
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        let threshold = self.level();
        threshold != LogLevel::Off && level >= threshold
    }

    /// Forward `record` if its level passes and a sink is installed
    pub fn emit(&self, record: &LogRecord<'_>) {
        if !self.is_enabled(record.level) {
            return;
        }
        // Clone out so a sink that logs again doesn't run under our read lock
        let sink = self.sink.read().clone();
        if let Some(sink) = sink {
            sink(record);
        }
    }
}

impl Default for LogSinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}
