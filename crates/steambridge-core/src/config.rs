//! Binding configuration

use crate::LogLevel;
use crate::error::{SteamError, SteamResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration supplied by the host when the binding is initialised
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// App id checked against the Steam client before init
    ///
    /// Only consulted when `restart_if_necessary` is set.
    #[serde(default)]
    pub app_id: Option<u32>,

    /// Explicit path to the SDK shared library
    ///
    /// Defaults to the platform library name, resolved by the loader search path.
    #[serde(default)]
    pub library_path: Option<PathBuf>,

    /// Ask the Steam client to relaunch the app when it wasn't started through Steam
    #[serde(default)]
    pub restart_if_necessary: bool,

    /// Initial log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Wall-clock deadline for a pending call, in milliseconds
    ///
    /// Unset means a call stays pending until the SDK reports it finished.
    #[serde(default)]
    pub call_timeout_ms: Option<u64>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            library_path: None,
            restart_if_necessary: false,
            log_level: default_log_level(),
            call_timeout_ms: None,
        }
    }
}

impl BridgeConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from JSON bytes; empty input yields defaults
    pub fn from_json(bytes: &[u8]) -> SteamResult<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that can't work
    pub fn validate(&self) -> SteamResult<()> {
        if LogLevel::parse(&self.log_level).is_none() {
            return Err(SteamError::Config(format!(
                "unknown log level: {}",
                self.log_level
            )));
        }
        if self.restart_if_necessary && self.app_id.is_none() {
            return Err(SteamError::Config(
                "restart_if_necessary requires app_id".to_string(),
            ));
        }
        if self.call_timeout_ms == Some(0) {
            return Err(SteamError::Config(
                "call_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parsed log level, falling back to Info
    pub fn log_level(&self) -> LogLevel {
        LogLevel::parse(&self.log_level).unwrap_or(LogLevel::Info)
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            call_timeout: self.call_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Dispatcher tuning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Abort a call still pending after this long; `None` waits on the SDK
    pub call_timeout: Option<Duration>,
}
