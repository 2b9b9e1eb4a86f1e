//! Fixed-layout async call result records
//!
//! The SDK fills a caller-provided buffer with a C struct when an async call
//! completes. Each record here mirrors one of those structs byte for byte and
//! converts between the raw buffer and a typed value.
//!
//! # Packing
//!
//! Steamworks declares its callback structs inside
//! `#pragma pack(push, VALVE_CALLBACK_PACK_*)`: 8-byte packing on Windows and
//! 4-byte packing on Linux and macOS. A field is aligned to the smaller of its
//! own size and the pack, and the struct size is rounded up the same way.
//! Offsets below are derived from that rule rather than hardcoded per target.
//!
//! ```text
//! LeaderboardScoreUploaded_t     pack 8            pack 4
//!   uint8  m_bSuccess            0                 0
//!   uint64 m_hSteamLeaderboard   8                 4
//!   int32  m_nScore              16                12
//!   uint8  m_bScoreChanged       20                16
//!   int32  m_nGlobalRankNew      24                20
//!   int32  m_nGlobalRankPrevious 28                24
//!   sizeof                       32                28
//! ```

use crate::error::DecodeError;
use crate::types::{
    EResult, GameId, LeaderboardEntriesHandle, LeaderboardHandle, SteamId, UgcHandle,
};
use serde::{Deserialize, Serialize};

/// Packing the SDK applies to callback structs on this target
pub const CALLBACK_PACK: usize = if cfg!(windows) { 8 } else { 4 };

/// Offset of a field of `size` bytes placed at or after `offset`
const fn align_to(offset: usize, size: usize) -> usize {
    let align = if size < CALLBACK_PACK {
        size
    } else {
        CALLBACK_PACK
    };
    offset.div_ceil(align) * align
}

/// Byte range readers/writers. Callers check the buffer length first.
fn take<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    u64::from_ne_bytes(take(bytes, offset))
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    i32::from_ne_bytes(take(bytes, offset))
}

fn read_bool(bytes: &[u8], offset: usize) -> bool {
    bytes[offset] != 0
}

fn write(buf: &mut [u8], offset: usize, value: &[u8]) {
    buf[offset..offset + value.len()].copy_from_slice(value);
}

fn ensure_len(record: &'static str, expected: usize, bytes: &[u8]) -> Result<(), DecodeError> {
    if bytes.len() < expected {
        return Err(DecodeError::BufferTooShort {
            record,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Which result record an async call produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultKind {
    UserStatsReceived,
    LeaderboardFindResult,
    LeaderboardScoresDownloaded,
    LeaderboardScoreUploaded,
    GlobalStatsReceived,
}

impl ResultKind {
    /// `k_iSteamUserStatsCallbacks`
    const USER_STATS_CALLBACKS: i32 = 1100;

    /// The SDK's `k_iCallback` id, passed as the expected callback to the poll call
    pub fn callback_id(self) -> i32 {
        Self::USER_STATS_CALLBACKS
            + match self {
                ResultKind::UserStatsReceived => 1,
                ResultKind::LeaderboardFindResult => 4,
                ResultKind::LeaderboardScoresDownloaded => 5,
                ResultKind::LeaderboardScoreUploaded => 6,
                ResultKind::GlobalStatsReceived => 12,
            }
    }

    pub fn from_callback_id(id: i32) -> Option<Self> {
        [
            ResultKind::UserStatsReceived,
            ResultKind::LeaderboardFindResult,
            ResultKind::LeaderboardScoresDownloaded,
            ResultKind::LeaderboardScoreUploaded,
            ResultKind::GlobalStatsReceived,
        ]
        .into_iter()
        .find(|kind| kind.callback_id() == id)
    }

    /// Declared byte size of the record
    pub fn size(self) -> usize {
        match self {
            ResultKind::UserStatsReceived => UserStatsReceived::SIZE,
            ResultKind::LeaderboardFindResult => LeaderboardFindResult::SIZE,
            ResultKind::LeaderboardScoresDownloaded => LeaderboardScoresDownloaded::SIZE,
            ResultKind::LeaderboardScoreUploaded => LeaderboardScoreUploaded::SIZE,
            ResultKind::GlobalStatsReceived => GlobalStatsReceived::SIZE,
        }
    }

    /// SDK struct name
    pub fn struct_name(self) -> &'static str {
        match self {
            ResultKind::UserStatsReceived => "UserStatsReceived_t",
            ResultKind::LeaderboardFindResult => "LeaderboardFindResult_t",
            ResultKind::LeaderboardScoresDownloaded => "LeaderboardScoresDownloaded_t",
            ResultKind::LeaderboardScoreUploaded => "LeaderboardScoreUploaded_t",
            ResultKind::GlobalStatsReceived => "GlobalStatsReceived_t",
        }
    }
}

impl std::fmt::Display for ResultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.struct_name())
    }
}

/// A fixed-layout record delivered by a completed async call
pub trait CallbackRecord: Sized + Send + 'static {
    const KIND: ResultKind;
    const SIZE: usize;

    /// Parse a record; fails only when `bytes` is shorter than [`Self::SIZE`]
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError>;

    /// Lay the record out exactly as the SDK would, padding zeroed
    fn encode(&self) -> Vec<u8>;

    fn into_result(self) -> CallResult;

    /// Unwrap the matching [`CallResult`] variant
    fn from_result(result: CallResult) -> Option<Self>;
}

/// `UserStatsReceived_t`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserStatsReceived {
    pub game_id: GameId,
    pub result: EResult,
    pub user: SteamId,
}

impl UserStatsReceived {
    const GAME_ID: usize = 0;
    const RESULT: usize = align_to(Self::GAME_ID + 8, 4);
    const USER: usize = align_to(Self::RESULT + 4, 8);
}

impl CallbackRecord for UserStatsReceived {
    const KIND: ResultKind = ResultKind::UserStatsReceived;
    const SIZE: usize = align_to(Self::USER + 8, 8);

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        ensure_len(Self::KIND.struct_name(), Self::SIZE, bytes)?;
        Ok(Self {
            game_id: GameId(read_u64(bytes, Self::GAME_ID)),
            result: EResult(read_i32(bytes, Self::RESULT)),
            user: SteamId(read_u64(bytes, Self::USER)),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0; Self::SIZE];
        write(&mut buf, Self::GAME_ID, &self.game_id.0.to_ne_bytes());
        write(&mut buf, Self::RESULT, &self.result.0.to_ne_bytes());
        write(&mut buf, Self::USER, &self.user.0.to_ne_bytes());
        buf
    }

    fn into_result(self) -> CallResult {
        CallResult::UserStatsReceived(self)
    }

    fn from_result(result: CallResult) -> Option<Self> {
        match result {
            CallResult::UserStatsReceived(record) => Some(record),
            _ => None,
        }
    }
}

/// `LeaderboardFindResult_t`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeaderboardFindResult {
    pub leaderboard: LeaderboardHandle,
    pub found: bool,
}

impl LeaderboardFindResult {
    const LEADERBOARD: usize = 0;
    const FOUND: usize = align_to(Self::LEADERBOARD + 8, 1);
}

impl CallbackRecord for LeaderboardFindResult {
    const KIND: ResultKind = ResultKind::LeaderboardFindResult;
    const SIZE: usize = align_to(Self::FOUND + 1, 8);

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        ensure_len(Self::KIND.struct_name(), Self::SIZE, bytes)?;
        Ok(Self {
            leaderboard: LeaderboardHandle(read_u64(bytes, Self::LEADERBOARD)),
            found: read_bool(bytes, Self::FOUND),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0; Self::SIZE];
        write(&mut buf, Self::LEADERBOARD, &self.leaderboard.0.to_ne_bytes());
        buf[Self::FOUND] = u8::from(self.found);
        buf
    }

    fn into_result(self) -> CallResult {
        CallResult::LeaderboardFindResult(self)
    }

    fn from_result(result: CallResult) -> Option<Self> {
        match result {
            CallResult::LeaderboardFindResult(record) => Some(record),
            _ => None,
        }
    }
}

/// `LeaderboardScoresDownloaded_t`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeaderboardScoresDownloaded {
    pub leaderboard: LeaderboardHandle,
    pub entries: LeaderboardEntriesHandle,
    pub entry_count: i32,
}

impl LeaderboardScoresDownloaded {
    const LEADERBOARD: usize = 0;
    const ENTRIES: usize = align_to(Self::LEADERBOARD + 8, 8);
    const ENTRY_COUNT: usize = align_to(Self::ENTRIES + 8, 4);
}

impl CallbackRecord for LeaderboardScoresDownloaded {
    const KIND: ResultKind = ResultKind::LeaderboardScoresDownloaded;
    const SIZE: usize = align_to(Self::ENTRY_COUNT + 4, 8);

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        ensure_len(Self::KIND.struct_name(), Self::SIZE, bytes)?;
        Ok(Self {
            leaderboard: LeaderboardHandle(read_u64(bytes, Self::LEADERBOARD)),
            entries: LeaderboardEntriesHandle(read_u64(bytes, Self::ENTRIES)),
            entry_count: read_i32(bytes, Self::ENTRY_COUNT),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0; Self::SIZE];
        write(&mut buf, Self::LEADERBOARD, &self.leaderboard.0.to_ne_bytes());
        write(&mut buf, Self::ENTRIES, &self.entries.0.to_ne_bytes());
        write(&mut buf, Self::ENTRY_COUNT, &self.entry_count.to_ne_bytes());
        buf
    }

    fn into_result(self) -> CallResult {
        CallResult::LeaderboardScoresDownloaded(self)
    }

    fn from_result(result: CallResult) -> Option<Self> {
        match result {
            CallResult::LeaderboardScoresDownloaded(record) => Some(record),
            _ => None,
        }
    }
}

/// `LeaderboardScoreUploaded_t`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeaderboardScoreUploaded {
    pub success: bool,
    pub leaderboard: LeaderboardHandle,
    pub score: i32,
    pub score_changed: bool,
    pub global_rank_new: i32,
    pub global_rank_previous: i32,
}

impl LeaderboardScoreUploaded {
    const SUCCESS: usize = 0;
    const LEADERBOARD: usize = align_to(Self::SUCCESS + 1, 8);
    const SCORE: usize = align_to(Self::LEADERBOARD + 8, 4);
    const SCORE_CHANGED: usize = align_to(Self::SCORE + 4, 1);
    const GLOBAL_RANK_NEW: usize = align_to(Self::SCORE_CHANGED + 1, 4);
    const GLOBAL_RANK_PREVIOUS: usize = align_to(Self::GLOBAL_RANK_NEW + 4, 4);
}

impl CallbackRecord for LeaderboardScoreUploaded {
    const KIND: ResultKind = ResultKind::LeaderboardScoreUploaded;
    const SIZE: usize = align_to(Self::GLOBAL_RANK_PREVIOUS + 4, 8);

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        ensure_len(Self::KIND.struct_name(), Self::SIZE, bytes)?;
        Ok(Self {
            success: read_bool(bytes, Self::SUCCESS),
            leaderboard: LeaderboardHandle(read_u64(bytes, Self::LEADERBOARD)),
            score: read_i32(bytes, Self::SCORE),
            score_changed: read_bool(bytes, Self::SCORE_CHANGED),
            global_rank_new: read_i32(bytes, Self::GLOBAL_RANK_NEW),
            global_rank_previous: read_i32(bytes, Self::GLOBAL_RANK_PREVIOUS),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0; Self::SIZE];
        buf[Self::SUCCESS] = u8::from(self.success);
        write(&mut buf, Self::LEADERBOARD, &self.leaderboard.0.to_ne_bytes());
        write(&mut buf, Self::SCORE, &self.score.to_ne_bytes());
        buf[Self::SCORE_CHANGED] = u8::from(self.score_changed);
        write(&mut buf, Self::GLOBAL_RANK_NEW, &self.global_rank_new.to_ne_bytes());
        write(
            &mut buf,
            Self::GLOBAL_RANK_PREVIOUS,
            &self.global_rank_previous.to_ne_bytes(),
        );
        buf
    }

    fn into_result(self) -> CallResult {
        CallResult::LeaderboardScoreUploaded(self)
    }

    fn from_result(result: CallResult) -> Option<Self> {
        match result {
            CallResult::LeaderboardScoreUploaded(record) => Some(record),
            _ => None,
        }
    }
}

/// `GlobalStatsReceived_t`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlobalStatsReceived {
    pub game_id: GameId,
    pub result: EResult,
}

impl GlobalStatsReceived {
    const GAME_ID: usize = 0;
    const RESULT: usize = align_to(Self::GAME_ID + 8, 4);
}

impl CallbackRecord for GlobalStatsReceived {
    const KIND: ResultKind = ResultKind::GlobalStatsReceived;
    const SIZE: usize = align_to(Self::RESULT + 4, 8);

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        ensure_len(Self::KIND.struct_name(), Self::SIZE, bytes)?;
        Ok(Self {
            game_id: GameId(read_u64(bytes, Self::GAME_ID)),
            result: EResult(read_i32(bytes, Self::RESULT)),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0; Self::SIZE];
        write(&mut buf, Self::GAME_ID, &self.game_id.0.to_ne_bytes());
        write(&mut buf, Self::RESULT, &self.result.0.to_ne_bytes());
        buf
    }

    fn into_result(self) -> CallResult {
        CallResult::GlobalStatsReceived(self)
    }

    fn from_result(result: CallResult) -> Option<Self> {
        match result {
            CallResult::GlobalStatsReceived(record) => Some(record),
            _ => None,
        }
    }
}

/// `LeaderboardEntry_t`, the out-argument of `GetDownloadedLeaderboardEntry`
///
/// Not a callback record: the native layer hands [`LeaderboardEntry::SIZE`]
/// zeroed bytes to the SDK and decodes what comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user: SteamId,
    pub global_rank: i32,
    pub score: i32,
    /// Number of details stored with the score, which may exceed what was fetched
    pub details_count: i32,
    pub ugc: UgcHandle,
}

impl LeaderboardEntry {
    const USER: usize = 0;
    const GLOBAL_RANK: usize = align_to(Self::USER + 8, 4);
    const SCORE: usize = align_to(Self::GLOBAL_RANK + 4, 4);
    const DETAILS_COUNT: usize = align_to(Self::SCORE + 4, 4);
    const UGC: usize = align_to(Self::DETAILS_COUNT + 4, 8);

    pub const SIZE: usize = align_to(Self::UGC + 8, 8);

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        ensure_len("LeaderboardEntry_t", Self::SIZE, bytes)?;
        Ok(Self {
            user: SteamId(read_u64(bytes, Self::USER)),
            global_rank: read_i32(bytes, Self::GLOBAL_RANK),
            score: read_i32(bytes, Self::SCORE),
            details_count: read_i32(bytes, Self::DETAILS_COUNT),
            ugc: UgcHandle(read_u64(bytes, Self::UGC)),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0; Self::SIZE];
        write(&mut buf, Self::USER, &self.user.0.to_ne_bytes());
        write(&mut buf, Self::GLOBAL_RANK, &self.global_rank.to_ne_bytes());
        write(&mut buf, Self::SCORE, &self.score.to_ne_bytes());
        write(&mut buf, Self::DETAILS_COUNT, &self.details_count.to_ne_bytes());
        write(&mut buf, Self::UGC, &self.ugc.0.to_ne_bytes());
        buf
    }
}

/// A decoded completion, one variant per [`ResultKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallResult {
    UserStatsReceived(UserStatsReceived),
    LeaderboardFindResult(LeaderboardFindResult),
    LeaderboardScoresDownloaded(LeaderboardScoresDownloaded),
    LeaderboardScoreUploaded(LeaderboardScoreUploaded),
    GlobalStatsReceived(GlobalStatsReceived),
}

impl CallResult {
    /// Decode `bytes` as the record `kind` declares
    pub fn decode(kind: ResultKind, bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(match kind {
            ResultKind::UserStatsReceived => UserStatsReceived::decode(bytes)?.into_result(),
            ResultKind::LeaderboardFindResult => {
                LeaderboardFindResult::decode(bytes)?.into_result()
            }
            ResultKind::LeaderboardScoresDownloaded => {
                LeaderboardScoresDownloaded::decode(bytes)?.into_result()
            }
            ResultKind::LeaderboardScoreUploaded => {
                LeaderboardScoreUploaded::decode(bytes)?.into_result()
            }
            ResultKind::GlobalStatsReceived => GlobalStatsReceived::decode(bytes)?.into_result(),
        })
    }

    pub fn kind(&self) -> ResultKind {
        match self {
            CallResult::UserStatsReceived(_) => ResultKind::UserStatsReceived,
            CallResult::LeaderboardFindResult(_) => ResultKind::LeaderboardFindResult,
            CallResult::LeaderboardScoresDownloaded(_) => ResultKind::LeaderboardScoresDownloaded,
            CallResult::LeaderboardScoreUploaded(_) => ResultKind::LeaderboardScoreUploaded,
            CallResult::GlobalStatsReceived(_) => ResultKind::GlobalStatsReceived,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            CallResult::UserStatsReceived(record) => record.encode(),
            CallResult::LeaderboardFindResult(record) => record.encode(),
            CallResult::LeaderboardScoresDownloaded(record) => record.encode(),
            CallResult::LeaderboardScoreUploaded(record) => record.encode(),
            CallResult::GlobalStatsReceived(record) => record.encode(),
        }
    }
}

#[cfg(test)]
#[path = "results/results_tests.rs"]
mod results_tests;
