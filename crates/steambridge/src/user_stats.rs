//! Leaderboard and stats workflows chained through the dispatcher
//!
//! Every workflow issues its first SDK call immediately and registers the
//! next step from inside the previous step's success continuation:
//!
//! ```text
//! read_leaderboard          find ──► download ──► on_row × N (or sentinel)
//! upload_leaderboard_score  find ──► upload   ──► on_uploaded
//! global_stats              request global    ──► on_stats (sorted)
//! increment_stat            request user      ──► read, +1, write ──► on_done
//! ```
//!
//! A workflow's `on_abort` is shared by all of its steps and fires at most
//! once, from whichever step failed. Later steps are never issued after an
//! abort.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::{Arc, Weak};
use std::time::Instant;
use steambridge_core::{
    CallFailure, CallbackRecord, EResult, GlobalStatsReceived, LeaderboardDisplayType,
    LeaderboardEntry, LeaderboardFindResult, LeaderboardHandle, LeaderboardRequest,
    LeaderboardScoreUploaded, LeaderboardScoresDownloaded, LeaderboardSortMethod,
    LeaderboardUploadScoreMethod, MAX_SCORE_DETAILS, ResultKind, ScoreDetails, SteamApiCall,
    UserStatsReceived, UserStatsSdk,
};
use steambridge_dispatch::{AbortReason, CallAborted, Dispatcher};

/// One row handed to the `on_row` continuation of [`UserStats::read_leaderboard`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    pub entry: LeaderboardEntry,
    /// Position within the download; -1 for the empty-download sentinel
    pub index: i32,
    /// Rows in the download; 0 for the sentinel
    pub count: i32,
    /// At most `min(entry.details_count, details_max)` values
    pub details: Vec<i32>,
}

impl LeaderboardRow {
    fn sentinel() -> Self {
        Self {
            entry: LeaderboardEntry::default(),
            index: -1,
            count: 0,
            details: Vec::new(),
        }
    }

    /// True for the single row delivered when a download came back empty
    pub fn is_sentinel(&self) -> bool {
        self.index < 0
    }
}

/// A named aggregate stat
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalStat {
    pub name: String,
    pub value: i64,
}

type AbortBox = Box<dyn FnOnce(CallAborted) + Send + 'static>;

/// The caller's `on_abort`, shared by every step of one workflow
#[derive(Clone)]
struct AbortSlot(Arc<Mutex<Option<AbortBox>>>);

impl AbortSlot {
    fn new<A>(on_abort: A) -> Self
    where
        A: FnOnce(CallAborted) + Send + 'static,
    {
        Self(Arc::new(Mutex::new(Some(Box::new(on_abort)))))
    }

    fn fire(&self, aborted: CallAborted) {
        let on_abort = self.0.lock().take();
        if let Some(on_abort) = on_abort {
            on_abort(aborted);
        }
    }

    fn handler(&self) -> impl FnOnce(CallAborted) + Send + 'static {
        let slot = self.clone();
        move |aborted| slot.fire(aborted)
    }
}

/// State carried from one step of a workflow to the next
///
/// Holds the dispatcher weakly: continuations live inside the dispatcher, so
/// a strong reference would keep it alive from within.
#[derive(Clone)]
struct Chain {
    sdk: Arc<dyn UserStatsSdk>,
    dispatcher: Weak<Dispatcher>,
    abort: AbortSlot,
    started: Instant,
}

impl Chain {
    /// Track `call` as the next step; `on_success` runs from a later pump
    fn register<T, S>(&self, call: SteamApiCall, on_success: S)
    where
        T: CallbackRecord,
        S: FnOnce(T) + Send + 'static,
    {
        if !call.is_valid() {
            tracing::warn!(kind = %T::KIND, "SDK refused to issue call");
            self.abort(call, T::KIND, AbortReason::Failed(CallFailure::InvalidHandle));
            return;
        }
        match self.dispatcher.upgrade() {
            Some(dispatcher) => {
                dispatcher.register::<T, _, _>(call, on_success, self.abort.handler())
            }
            None => self.abort(call, T::KIND, AbortReason::Abandoned),
        }
    }

    fn abort(&self, call: SteamApiCall, kind: ResultKind, reason: AbortReason) {
        self.abort.fire(CallAborted::new(call, kind, reason, self.started));
    }

    /// The leaderboard handle of a find step, or abort with `NotFound`
    fn found(
        &self,
        call: SteamApiCall,
        result: LeaderboardFindResult,
    ) -> Option<LeaderboardHandle> {
        if result.found {
            return Some(result.leaderboard);
        }
        self.abort(call, LeaderboardFindResult::KIND, AbortReason::NotFound);
        None
    }

    /// Abort with `Rejected` unless the SDK reported `k_EResultOK`
    fn accepted(&self, call: SteamApiCall, kind: ResultKind, result: EResult) -> bool {
        if result.is_ok() {
            return true;
        }
        self.abort(call, kind, AbortReason::Rejected(result));
        false
    }

    fn deliver_rows<R>(
        &self,
        downloaded: LeaderboardScoresDownloaded,
        details_max: usize,
        on_row: &mut R,
    ) where
        R: FnMut(LeaderboardRow),
    {
        let count = downloaded.entry_count;
        if count <= 0 {
            on_row(LeaderboardRow::sentinel());
            return;
        }

        for index in 0..count {
            let row = self
                .sdk
                .downloaded_leaderboard_entry(downloaded.entries, index, details_max);
            let (entry, mut details) = row.unwrap_or_else(|| {
                tracing::warn!(
                    entries = %downloaded.entries,
                    index,
                    "leaderboard row unavailable, delivering an empty entry"
                );
                (LeaderboardEntry::default(), Vec::new())
            });
            let stored = usize::try_from(entry.details_count).unwrap_or(0);
            details.truncate(stored.min(details_max));
            on_row(LeaderboardRow {
                entry,
                index,
                count,
                details,
            });
        }
    }
}

/// Leaderboards, stats and achievements for the local user
#[derive(Clone)]
pub struct UserStats {
    sdk: Arc<dyn UserStatsSdk>,
    dispatcher: Arc<Dispatcher>,
}

impl UserStats {
    pub fn new(sdk: Arc<dyn UserStatsSdk>, dispatcher: Arc<Dispatcher>) -> Self {
        Self { sdk, dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    fn chain<A>(&self, on_abort: A) -> Chain
    where
        A: FnOnce(CallAborted) + Send + 'static,
    {
        Chain {
            sdk: self.sdk.clone(),
            dispatcher: Arc::downgrade(&self.dispatcher),
            abort: AbortSlot::new(on_abort),
            started: Instant::now(),
        }
    }

    /// Download rows of the leaderboard `name` and hand each to `on_row`
    ///
    /// Rows arrive in download order, within the pump pass that completed the
    /// download. An empty download yields a single sentinel row instead, so
    /// "no rows" is told apart from failure by which continuation ran. A row
    /// the SDK can't return is delivered as a default entry with no details.
    /// `details_max` is capped at [`MAX_SCORE_DETAILS`].
    pub fn read_leaderboard<R, A>(
        &self,
        name: &str,
        request: LeaderboardRequest,
        details_max: usize,
        on_row: R,
        on_abort: A,
    ) where
        R: FnMut(LeaderboardRow) + Send + 'static,
        A: FnOnce(CallAborted) + Send + 'static,
    {
        let details_max = details_max.min(MAX_SCORE_DETAILS);
        let chain = self.chain(on_abort);
        let find = self.sdk.find_leaderboard(name);
        tracing::debug!(name, %find, "reading leaderboard");

        let step = chain.clone();
        chain.register::<LeaderboardFindResult, _>(find, move |result| {
            let Some(leaderboard) = step.found(find, result) else {
                return;
            };
            let download = step.sdk.download_leaderboard_entries(leaderboard, &request);
            let rows = step.clone();
            step.register::<LeaderboardScoresDownloaded, _>(download, move |downloaded| {
                let mut on_row = on_row;
                rows.deliver_rows(downloaded, details_max, &mut on_row);
            });
        });
    }

    /// Find the leaderboard `name` and upload `score` to it
    pub fn upload_leaderboard_score<U, A>(
        &self,
        name: &str,
        method: LeaderboardUploadScoreMethod,
        score: i32,
        details: ScoreDetails,
        on_uploaded: U,
        on_abort: A,
    ) where
        U: FnOnce(LeaderboardScoreUploaded) + Send + 'static,
        A: FnOnce(CallAborted) + Send + 'static,
    {
        let chain = self.chain(on_abort);
        let find = self.sdk.find_leaderboard(name);
        tracing::debug!(name, %find, score, "uploading leaderboard score");

        let step = chain.clone();
        chain.register::<LeaderboardFindResult, _>(find, move |result| {
            let Some(leaderboard) = step.found(find, result) else {
                return;
            };
            let upload = step.sdk.upload_leaderboard_score(
                leaderboard,
                method,
                score,
                details.as_slice(),
            );
            step.register::<LeaderboardScoreUploaded, _>(upload, on_uploaded);
        });
    }

    /// Resolve `name`, creating the leaderboard when it doesn't exist yet
    pub fn find_or_create_leaderboard<F, A>(
        &self,
        name: &str,
        sort: LeaderboardSortMethod,
        display: LeaderboardDisplayType,
        on_found: F,
        on_abort: A,
    ) where
        F: FnOnce(LeaderboardHandle) + Send + 'static,
        A: FnOnce(CallAborted) + Send + 'static,
    {
        let chain = self.chain(on_abort);
        let find = self.sdk.find_or_create_leaderboard(name, sort, display);

        let step = chain.clone();
        chain.register::<LeaderboardFindResult, _>(find, move |result| {
            if let Some(leaderboard) = step.found(find, result) {
                on_found(leaderboard);
            }
        });
    }

    /// Display name of a resolved leaderboard
    pub fn leaderboard_name(&self, leaderboard: LeaderboardHandle) -> Option<String> {
        self.sdk.leaderboard_name(leaderboard)
    }

    /// Fetch the named aggregate stats, sorted ascending by value
    ///
    /// Ties keep the order of `names`. Names the SDK can't resolve are
    /// skipped rather than failing the whole request, so the list can be
    /// shorter than `names`.
    pub fn global_stats<N, S, A>(&self, names: N, on_stats: S, on_abort: A)
    where
        N: IntoIterator,
        N::Item: Into<String>,
        S: FnOnce(Vec<GlobalStat>) + Send + 'static,
        A: FnOnce(CallAborted) + Send + 'static,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let chain = self.chain(on_abort);
        let call = self.sdk.request_global_stats(0);
        tracing::debug!(%call, names = names.len(), "requesting global stats");

        let step = chain.clone();
        chain.register::<GlobalStatsReceived, _>(call, move |received| {
            if !step.accepted(call, GlobalStatsReceived::KIND, received.result) {
                return;
            }
            let mut stats: Vec<GlobalStat> = names
                .into_iter()
                .filter_map(|name| match step.sdk.global_stat_i64(&name) {
                    Some(value) => Some(GlobalStat { name, value }),
                    None => {
                        tracing::warn!(name = %name, "global stat unavailable, skipped");
                        None
                    }
                })
                .collect();
            stats.sort_by_key(|stat| stat.value);
            on_stats(stats);
        });
    }

    /// Add one to the local user's stat `name`; `on_done` gets the new value
    ///
    /// The change is local until [`store_stats`](Self::store_stats) is called.
    pub fn increment_stat<D, A>(&self, name: &str, on_done: D, on_abort: A)
    where
        D: FnOnce(i32) + Send + 'static,
        A: FnOnce(CallAborted) + Send + 'static,
    {
        let name = name.to_string();
        let chain = self.chain(on_abort);
        let call = self.sdk.request_user_stats(self.sdk.local_user());
        tracing::debug!(%call, name = %name, "incrementing stat");

        let step = chain.clone();
        chain.register::<UserStatsReceived, _>(call, move |received| {
            if !step.accepted(call, UserStatsReceived::KIND, received.result) {
                return;
            }
            let Some(current) = step.sdk.stat_i32(&name) else {
                step.abort(call, UserStatsReceived::KIND, AbortReason::NotFound);
                return;
            };
            let value = current.saturating_add(1);
            if !step.sdk.set_stat_i32(&name, value) {
                step.abort(call, UserStatsReceived::KIND, AbortReason::Rejected(EResult::FAIL));
                return;
            }
            on_done(value);
        });
    }

    /// Current value of the local user's stat, once user stats are loaded
    pub fn stat(&self, name: &str) -> Option<i32> {
        self.sdk.stat_i32(name)
    }

    pub fn achievement(&self, name: &str) -> Option<bool> {
        self.sdk.achievement(name)
    }

    pub fn set_achievement(&self, name: &str) -> bool {
        self.sdk.set_achievement(name)
    }

    pub fn clear_achievement(&self, name: &str) -> bool {
        self.sdk.clear_achievement(name)
    }

    /// Send changed stats and achievements to the backend
    pub fn store_stats(&self) -> bool {
        self.sdk.store_stats()
    }
}

impl std::fmt::Debug for UserStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStats")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
