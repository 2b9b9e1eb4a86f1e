//! Seams between the dispatcher/workflows and the native SDK
//!
//! The native crate implements these against the real flat API; tests
//! implement them with scripted fakes.

use crate::results::{LeaderboardEntry, ResultKind};
use crate::types::{
    CallFailure, LeaderboardDisplayType, LeaderboardEntriesHandle, LeaderboardHandle,
    LeaderboardRequest, LeaderboardSortMethod, LeaderboardUploadScoreMethod, SteamApiCall,
    SteamId,
};

/// Outcome of one non-blocking probe of an async call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// Not finished yet; poll again on a later pump
    Pending,
    /// Finished without a usable result
    Failed,
    /// Finished; the buffer holds the result record
    Completed,
}

impl PollStatus {
    /// Map the SDK's `(returned, *pbFailed)` pair
    ///
    /// `GetAPICallResult` returns false while the call is still running and
    /// sets the failure flag once it finished badly, including unknown handles.
    pub fn from_raw(completed: bool, failed: bool) -> Self {
        match (completed, failed) {
            (_, true) => PollStatus::Failed,
            (true, false) => PollStatus::Completed,
            (false, false) => PollStatus::Pending,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, PollStatus::Pending)
    }
}

/// Result retrieval half of `ISteamUtils`
pub trait CallResultSource: Send + Sync {
    /// Probe `call` once, filling `buf` with the `expected` record on completion
    ///
    /// `buf.len()` is the size argument handed to the SDK. Must never block.
    fn poll_call_result(
        &self,
        call: SteamApiCall,
        expected: ResultKind,
        buf: &mut [u8],
    ) -> PollStatus;

    /// Why a call reported failure
    fn call_failure_reason(&self, call: SteamApiCall) -> CallFailure;
}

/// The parts of `ISteamUserStats` the workflows drive
///
/// Methods returning [`SteamApiCall`] issue an async request; an
/// [`SteamApiCall::INVALID`] handle means the SDK refused to start it.
pub trait UserStatsSdk: Send + Sync {
    fn find_leaderboard(&self, name: &str) -> SteamApiCall;

    fn find_or_create_leaderboard(
        &self,
        name: &str,
        sort: LeaderboardSortMethod,
        display: LeaderboardDisplayType,
    ) -> SteamApiCall;

    fn leaderboard_name(&self, leaderboard: LeaderboardHandle) -> Option<String>;

    /// Issue the download matching `request`'s scope
    fn download_leaderboard_entries(
        &self,
        leaderboard: LeaderboardHandle,
        request: &LeaderboardRequest,
    ) -> SteamApiCall;

    /// Read row `index` of a completed download along with up to `details_max` details
    fn downloaded_leaderboard_entry(
        &self,
        entries: LeaderboardEntriesHandle,
        index: i32,
        details_max: usize,
    ) -> Option<(LeaderboardEntry, Vec<i32>)>;

    fn upload_leaderboard_score(
        &self,
        leaderboard: LeaderboardHandle,
        method: LeaderboardUploadScoreMethod,
        score: i32,
        details: &[i32],
    ) -> SteamApiCall;

    /// Request aggregate stats; `history_days == 0` fetches totals only
    fn request_global_stats(&self, history_days: i32) -> SteamApiCall;

    fn global_stat_i64(&self, name: &str) -> Option<i64>;

    fn request_user_stats(&self, user: SteamId) -> SteamApiCall;

    /// The local user, for stats requests
    fn local_user(&self) -> SteamId;

    fn stat_i32(&self, name: &str) -> Option<i32>;

    fn set_stat_i32(&self, name: &str, value: i32) -> bool;

    fn achievement(&self, name: &str) -> Option<bool>;

    fn set_achievement(&self, name: &str) -> bool;

    fn clear_achievement(&self, name: &str) -> bool;

    fn store_stats(&self) -> bool;
}
