//! `ISteamUserStats` over the flat API

use crate::library::{Interface, NamedFlagFn, SteamLibrary};
use std::ffi::{CStr, CString, c_int, c_void};
use std::sync::Arc;
use steambridge_core::{
    LeaderboardDisplayType, LeaderboardEntriesHandle, LeaderboardEntry, LeaderboardHandle,
    LeaderboardRequest, LeaderboardSortMethod, LeaderboardUploadScoreMethod, MAX_SCORE_DETAILS,
    SteamApiCall, SteamId, UserStatsSdk,
};

/// Convert a name for the SDK, logging and rejecting interior NULs
pub(crate) fn c_name(name: &str) -> Option<CString> {
    match CString::new(name) {
        Ok(name) => Some(name),
        Err(e) => {
            tracing::error!(name, error = %e, "name contains an interior NUL byte");
            None
        }
    }
}

/// [`UserStatsSdk`] backed by the real SDK
pub struct NativeUserStats {
    library: Arc<SteamLibrary>,
    stats: Interface,
    user: Interface,
}

// SAFETY: see NativeUtils; interface pointers are process-global singletons
unsafe impl Send for NativeUserStats {}
unsafe impl Sync for NativeUserStats {}

impl NativeUserStats {
    pub(crate) fn new(library: Arc<SteamLibrary>, stats: Interface, user: Interface) -> Self {
        Self {
            library,
            stats,
            user,
        }
    }

    fn named_flag(&self, f: NamedFlagFn, name: &str) -> bool {
        let Some(name) = c_name(name) else {
            return false;
        };
        // SAFETY: name is NUL-terminated and outlives the call
        unsafe { f(self.stats, name.as_ptr()) }
    }
}

impl UserStatsSdk for NativeUserStats {
    fn find_leaderboard(&self, name: &str) -> SteamApiCall {
        let Some(name) = c_name(name) else {
            return SteamApiCall::INVALID;
        };
        // SAFETY: name is NUL-terminated and outlives the call
        SteamApiCall(unsafe { (self.library.api().find_leaderboard)(self.stats, name.as_ptr()) })
    }

    fn find_or_create_leaderboard(
        &self,
        name: &str,
        sort: LeaderboardSortMethod,
        display: LeaderboardDisplayType,
    ) -> SteamApiCall {
        let Some(name) = c_name(name) else {
            return SteamApiCall::INVALID;
        };
        // SAFETY: name is NUL-terminated and outlives the call
        SteamApiCall(unsafe {
            (self.library.api().find_or_create_leaderboard)(
                self.stats,
                name.as_ptr(),
                sort as c_int,
                display as c_int,
            )
        })
    }

    fn leaderboard_name(&self, leaderboard: LeaderboardHandle) -> Option<String> {
        // SAFETY: plain value arguments
        let name = unsafe { (self.library.api().get_leaderboard_name)(self.stats, leaderboard.raw()) };
        if name.is_null() {
            return None;
        }
        // SAFETY: non-null names are NUL-terminated strings owned by the SDK
        Some(unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned())
    }

    fn download_leaderboard_entries(
        &self,
        leaderboard: LeaderboardHandle,
        request: &LeaderboardRequest,
    ) -> SteamApiCall {
        let api = self.library.api();
        if let LeaderboardRequest::Users(users) = request {
            let mut users: Vec<u64> = users.iter().map(|user| user.raw()).collect();
            let Ok(count) = c_int::try_from(users.len()) else {
                tracing::error!(count = users.len(), "too many users for one download");
                return SteamApiCall::INVALID;
            };
            // SAFETY: CSteamID is a single u64; the array outlives the call
            return SteamApiCall(unsafe {
                (api.download_leaderboard_entries_for_users)(
                    self.stats,
                    leaderboard.raw(),
                    users.as_mut_ptr(),
                    count,
                )
            });
        }

        let (start, end) = request.range();
        // SAFETY: plain value arguments
        SteamApiCall(unsafe {
            (api.download_leaderboard_entries)(
                self.stats,
                leaderboard.raw(),
                request.data_request() as c_int,
                start,
                end,
            )
        })
    }

    fn downloaded_leaderboard_entry(
        &self,
        entries: LeaderboardEntriesHandle,
        index: i32,
        details_max: usize,
    ) -> Option<(LeaderboardEntry, Vec<i32>)> {
        let details_max = details_max.min(MAX_SCORE_DETAILS);
        let mut entry = [0u8; LeaderboardEntry::SIZE];
        let mut details = vec![0i32; details_max];
        // SAFETY: entry holds a LeaderboardEntry_t for this platform's packing
        // and details has room for details_max values
        let ok = unsafe {
            (self.library.api().get_downloaded_leaderboard_entry)(
                self.stats,
                entries.raw(),
                index,
                entry.as_mut_ptr().cast::<c_void>(),
                details.as_mut_ptr(),
                details_max as c_int,
            )
        };
        if !ok {
            return None;
        }

        let entry = match LeaderboardEntry::decode(&entry) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::error!(error = %e, "leaderboard entry decode failed");
                return None;
            }
        };
        let stored = usize::try_from(entry.details_count).unwrap_or(0);
        details.truncate(stored.min(details_max));
        Some((entry, details))
    }

    fn upload_leaderboard_score(
        &self,
        leaderboard: LeaderboardHandle,
        method: LeaderboardUploadScoreMethod,
        score: i32,
        details: &[i32],
    ) -> SteamApiCall {
        if details.len() > MAX_SCORE_DETAILS {
            tracing::error!(count = details.len(), "too many score details");
            return SteamApiCall::INVALID;
        }
        // SAFETY: details is valid for details.len() reads during the call
        SteamApiCall(unsafe {
            (self.library.api().upload_leaderboard_score)(
                self.stats,
                leaderboard.raw(),
                method as c_int,
                score,
                details.as_ptr(),
                details.len() as c_int,
            )
        })
    }

    fn request_global_stats(&self, history_days: i32) -> SteamApiCall {
        // SAFETY: plain value arguments
        SteamApiCall(unsafe { (self.library.api().request_global_stats)(self.stats, history_days) })
    }

    fn global_stat_i64(&self, name: &str) -> Option<i64> {
        let name = c_name(name)?;
        let mut value = 0i64;
        // SAFETY: name is NUL-terminated; value is a valid out pointer
        let ok = unsafe {
            (self.library.api().get_global_stat_int64)(self.stats, name.as_ptr(), &mut value)
        };
        ok.then_some(value)
    }

    fn request_user_stats(&self, user: SteamId) -> SteamApiCall {
        // SAFETY: plain value arguments
        SteamApiCall(unsafe { (self.library.api().request_user_stats)(self.stats, user.raw()) })
    }

    fn local_user(&self) -> SteamId {
        // SAFETY: plain value arguments
        SteamId(unsafe { (self.library.api().get_steam_id)(self.user) })
    }

    fn stat_i32(&self, name: &str) -> Option<i32> {
        let name = c_name(name)?;
        let mut value = 0i32;
        // SAFETY: name is NUL-terminated; value is a valid out pointer
        let ok = unsafe { (self.library.api().get_stat_int32)(self.stats, name.as_ptr(), &mut value) };
        ok.then_some(value)
    }

    fn set_stat_i32(&self, name: &str, value: i32) -> bool {
        let Some(name) = c_name(name) else {
            return false;
        };
        // SAFETY: name is NUL-terminated and outlives the call
        unsafe { (self.library.api().set_stat_int32)(self.stats, name.as_ptr(), value) }
    }

    fn achievement(&self, name: &str) -> Option<bool> {
        let name = c_name(name)?;
        let mut achieved = false;
        // SAFETY: name is NUL-terminated; achieved is a valid out pointer
        let ok = unsafe {
            (self.library.api().get_achievement)(self.stats, name.as_ptr(), &mut achieved)
        };
        ok.then_some(achieved)
    }

    fn set_achievement(&self, name: &str) -> bool {
        self.named_flag(self.library.api().set_achievement, name)
    }

    fn clear_achievement(&self, name: &str) -> bool {
        self.named_flag(self.library.api().clear_achievement, name)
    }

    fn store_stats(&self) -> bool {
        // SAFETY: plain value arguments
        unsafe { (self.library.api().store_stats)(self.stats) }
    }
}

impl std::fmt::Debug for NativeUserStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeUserStats").finish_non_exhaustive()
    }
}
