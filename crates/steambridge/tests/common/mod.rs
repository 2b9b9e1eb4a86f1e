//! Scripted stand-in for the SDK, implementing both seam traits

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use steambridge::{Dispatcher, DispatcherConfig, UserStats};
use steambridge_core::{
    CallFailure, CallResultSource, CallbackRecord, LeaderboardDisplayType,
    LeaderboardEntriesHandle, LeaderboardEntry, LeaderboardHandle, LeaderboardRequest,
    LeaderboardSortMethod, LeaderboardUploadScoreMethod, PollStatus, ResultKind, SteamApiCall,
    SteamId, UserStatsSdk,
};

/// How an issued call resolves
#[derive(Debug, Clone)]
pub enum Reply {
    /// Stay pending for this many polls, then apply the inner reply
    After(u32, Box<Reply>),
    Complete(Vec<u8>),
    Fail(CallFailure),
}

impl Reply {
    pub fn ok<T: CallbackRecord>(record: T) -> Self {
        Reply::Complete(record.encode())
    }

    pub fn after(polls: u32, reply: Reply) -> Self {
        Reply::After(polls, Box::new(reply))
    }
}

/// An SDK request the workflows made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issued {
    Find(String),
    FindOrCreate(String),
    Download(LeaderboardHandle, LeaderboardRequest),
    Upload(LeaderboardHandle, i32, Vec<i32>),
    GlobalStats(i32),
    UserStats(SteamId),
    SetStat(String, i32),
}

pub const LOCAL_USER: SteamId = SteamId(76_561_197_960_287_930);

#[derive(Default)]
pub struct FakeSteam {
    next_call: AtomicU64,
    /// Replies handed to calls in issue order
    replies: Mutex<VecDeque<Reply>>,
    active: Mutex<HashMap<SteamApiCall, Reply>>,
    pub issued: Mutex<Vec<Issued>>,
    pub rows: Mutex<Vec<(LeaderboardEntry, Vec<i32>)>>,
    pub global: Mutex<HashMap<String, i64>>,
    pub stats: Mutex<HashMap<String, i32>>,
    pub achievements: Mutex<HashMap<String, bool>>,
    pub refuse_set_stat: Mutex<bool>,
    /// Uploads return the invalid handle, as the SDK does for bad arguments
    pub refuse_uploads: Mutex<bool>,
    pub stored: Mutex<u32>,
}

impl FakeSteam {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_call: AtomicU64::new(1000),
            ..Self::default()
        })
    }

    /// Queue the reply for the next issued call
    pub fn reply(&self, reply: Reply) {
        self.replies.lock().push_back(reply);
    }

    pub fn issued(&self) -> Vec<Issued> {
        self.issued.lock().clone()
    }

    fn issue(&self, what: Issued) -> SteamApiCall {
        self.issued.lock().push(what);
        let call = SteamApiCall(self.next_call.fetch_add(1, Ordering::SeqCst));
        if let Some(reply) = self.replies.lock().pop_front() {
            self.active.lock().insert(call, reply);
        }
        call
    }
}

impl CallResultSource for FakeSteam {
    fn poll_call_result(
        &self,
        call: SteamApiCall,
        _expected: ResultKind,
        buf: &mut [u8],
    ) -> PollStatus {
        let mut active = self.active.lock();
        let Some(reply) = active.get_mut(&call) else {
            return PollStatus::Pending;
        };
        if let Reply::After(polls, next) = reply {
            if *polls > 0 {
                *polls -= 1;
                return PollStatus::Pending;
            }
            let next = (**next).clone();
            *reply = next;
        }
        match reply.clone() {
            Reply::Complete(bytes) => {
                let len = bytes.len().min(buf.len());
                buf[..len].copy_from_slice(&bytes[..len]);
                PollStatus::Completed
            }
            Reply::Fail(_) => PollStatus::Failed,
            Reply::After(..) => PollStatus::Pending,
        }
    }

    fn call_failure_reason(&self, call: SteamApiCall) -> CallFailure {
        match self.active.lock().get(&call) {
            Some(Reply::Fail(reason)) => *reason,
            _ => CallFailure::None,
        }
    }
}

impl UserStatsSdk for FakeSteam {
    fn find_leaderboard(&self, name: &str) -> SteamApiCall {
        self.issue(Issued::Find(name.to_string()))
    }

    fn find_or_create_leaderboard(
        &self,
        name: &str,
        _sort: LeaderboardSortMethod,
        _display: LeaderboardDisplayType,
    ) -> SteamApiCall {
        self.issue(Issued::FindOrCreate(name.to_string()))
    }

    fn leaderboard_name(&self, leaderboard: LeaderboardHandle) -> Option<String> {
        Some(format!("board-{leaderboard}"))
    }

    fn download_leaderboard_entries(
        &self,
        leaderboard: LeaderboardHandle,
        request: &LeaderboardRequest,
    ) -> SteamApiCall {
        self.issue(Issued::Download(leaderboard, request.clone()))
    }

    fn downloaded_leaderboard_entry(
        &self,
        _entries: LeaderboardEntriesHandle,
        index: i32,
        details_max: usize,
    ) -> Option<(LeaderboardEntry, Vec<i32>)> {
        let rows = self.rows.lock();
        let (entry, details) = rows.get(usize::try_from(index).ok()?)?;
        Some((*entry, details.iter().copied().take(details_max).collect()))
    }

    fn upload_leaderboard_score(
        &self,
        leaderboard: LeaderboardHandle,
        _method: LeaderboardUploadScoreMethod,
        score: i32,
        details: &[i32],
    ) -> SteamApiCall {
        if *self.refuse_uploads.lock() {
            return SteamApiCall::INVALID;
        }
        self.issue(Issued::Upload(leaderboard, score, details.to_vec()))
    }

    fn request_global_stats(&self, history_days: i32) -> SteamApiCall {
        self.issue(Issued::GlobalStats(history_days))
    }

    fn global_stat_i64(&self, name: &str) -> Option<i64> {
        self.global.lock().get(name).copied()
    }

    fn request_user_stats(&self, user: SteamId) -> SteamApiCall {
        self.issue(Issued::UserStats(user))
    }

    fn local_user(&self) -> SteamId {
        LOCAL_USER
    }

    fn stat_i32(&self, name: &str) -> Option<i32> {
        self.stats.lock().get(name).copied()
    }

    fn set_stat_i32(&self, name: &str, value: i32) -> bool {
        if *self.refuse_set_stat.lock() {
            return false;
        }
        self.issued.lock().push(Issued::SetStat(name.to_string(), value));
        self.stats.lock().insert(name.to_string(), value);
        true
    }

    fn achievement(&self, name: &str) -> Option<bool> {
        self.achievements.lock().get(name).copied()
    }

    fn set_achievement(&self, name: &str) -> bool {
        self.achievements.lock().insert(name.to_string(), true);
        true
    }

    fn clear_achievement(&self, name: &str) -> bool {
        self.achievements
            .lock()
            .get_mut(name)
            .map(|achieved| *achieved = false)
            .is_some()
    }

    fn store_stats(&self) -> bool {
        *self.stored.lock() += 1;
        true
    }
}

/// Workflows over `fake`, plus the dispatcher they register with
pub fn user_stats(fake: &Arc<FakeSteam>) -> (UserStats, Arc<Dispatcher>) {
    let dispatcher = Arc::new(Dispatcher::new(fake.clone(), DispatcherConfig::default()));
    (UserStats::new(fake.clone(), dispatcher.clone()), dispatcher)
}

/// Pump until nothing is pending, bounded so a stuck test fails instead of hanging
pub fn pump_until_idle(dispatcher: &Dispatcher) -> usize {
    let mut passes = 0;
    while dispatcher.pending_count() > 0 {
        assert!(passes < 100, "calls still pending after {passes} passes");
        dispatcher.pump();
        passes += 1;
    }
    passes
}

/// Records continuation invocations in order
#[derive(Default)]
pub struct Log<T> {
    events: Mutex<Vec<T>>,
}

impl<T: Clone> Log<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn push(&self, event: T) {
        self.events.lock().push(event);
    }

    pub fn events(&self) -> Vec<T> {
        self.events.lock().clone()
    }
}
