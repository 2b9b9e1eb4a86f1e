//! steambridge-core - SDK types, result decoding and seam traits
//!
//! This crate provides the foundational pieces shared by every steambridge crate:
//! - [`types`] newtype identifiers and enums mirroring the Steamworks flat API
//! - [`results`] decoding of the fixed-layout async call result records
//! - [`CallResultSource`] and [`UserStatsSdk`], the traits the native layer implements
//! - [`SteamError`] for error handling
//! - [`BridgeConfig`] for configuration

mod config;
mod error;
mod sdk;

pub mod results;
pub mod types;

pub use config::{BridgeConfig, DispatcherConfig};
pub use error::{DecodeError, SteamError, SteamResult};
pub use results::{
    CallResult, CallbackRecord, GlobalStatsReceived, LeaderboardEntry, LeaderboardFindResult,
    LeaderboardScoreUploaded, LeaderboardScoresDownloaded, ResultKind, UserStatsReceived,
};
pub use sdk::{CallResultSource, PollStatus, UserStatsSdk};
pub use types::{
    AppId, CallFailure, EResult, GameId, LeaderboardDataRequest, LeaderboardDisplayType,
    LeaderboardEntriesHandle, LeaderboardHandle, LeaderboardRequest, LeaderboardSortMethod,
    LeaderboardUploadScoreMethod, MAX_SCORE_DETAILS, ScoreDetails, SteamApiCall, SteamId,
    UgcHandle,
};

/// Log levels shared with the host log sink
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Off = 5,
}

impl LogLevel {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Off,
        }
    }

    /// Parse a configuration level name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            "off" => Some(LogLevel::Off),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BridgeConfig, CallResult, CallResultSource, CallbackRecord, LeaderboardRequest, LogLevel,
        ResultKind, ScoreDetails, SteamApiCall, SteamError, SteamResult, UserStatsSdk,
    };
}
