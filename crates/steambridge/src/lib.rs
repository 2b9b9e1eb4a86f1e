//! steambridge - Completion-style callbacks over the Steamworks flat API
//!
//! [`SteamClient`] loads and initialises the SDK. Its [`UserStats`] issues
//! leaderboard and stats requests, each finishing in exactly one of a success
//! or an abort continuation. Nothing completes unless the host calls
//! [`SteamClient::run_callbacks`] regularly.
//!
//! ```ignore
//! let client = SteamClient::init(BridgeConfig::from_json(br#"{"app_id": 480}"#)?)?;
//! client.user_stats().global_stats(
//!     ["wins", "losses"],
//!     |stats| println!("{stats:?}"),
//!     |aborted| eprintln!("{aborted}"),
//! );
//! loop {
//!     client.run_callbacks();
//!     // frame work
//! }
//! ```

mod client;
mod user_stats;

pub use client::SteamClient;
pub use user_stats::{GlobalStat, LeaderboardRow, UserStats};

pub use steambridge_core::{
    BridgeConfig, CallFailure, DispatcherConfig, EResult, LeaderboardDisplayType,
    LeaderboardEntry, LeaderboardHandle, LeaderboardRequest, LeaderboardScoreUploaded,
    LeaderboardSortMethod, LeaderboardUploadScoreMethod, LogLevel, MAX_SCORE_DETAILS,
    ScoreDetails, SteamError, SteamId, SteamResult,
};
pub use steambridge_dispatch::{AbortReason, CallAborted, CallResultFuture, Dispatcher, PumpSummary};
pub use steambridge_logging::{HostLogSink, LogRecord, LogSinkRegistry, init_logging};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AbortReason, BridgeConfig, CallAborted, GlobalStat, LeaderboardRequest, LeaderboardRow,
        ScoreDetails, SteamClient, SteamError, SteamResult, UserStats,
    };
}
