//! Identifiers and enums mirroring the Steamworks flat API
//!
//! Every identifier the SDK hands out is a bare integer on the C side. They are
//! wrapped here so a leaderboard handle can't be passed where a call handle is
//! expected.

use crate::error::{SteamError, SteamResult};
use serde::{Deserialize, Serialize};

macro_rules! sdk_id {
    ($(#[$meta:meta])* $name:ident($repr:ty)) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $repr);

        impl $name {
            /// Raw value as passed across the C boundary
            #[inline]
            pub const fn raw(self) -> $repr {
                self.0
            }
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

sdk_id!(
    /// Application id
    AppId(u32)
);
sdk_id!(
    /// 64-bit user identifier
    SteamId(u64)
);
sdk_id!(
    /// 64-bit game identifier carried by stats callbacks
    GameId(u64)
);
sdk_id!(
    /// Opaque handle returned by every async SDK call
    SteamApiCall(u64)
);
sdk_id!(
    /// Handle to a leaderboard resolved by a find call
    LeaderboardHandle(u64)
);
sdk_id!(
    /// Handle to a downloaded batch of leaderboard entries
    LeaderboardEntriesHandle(u64)
);
sdk_id!(
    /// Handle to user generated content attached to a leaderboard entry
    UgcHandle(u64)
);

impl SteamApiCall {
    /// The SDK's `k_uAPICallInvalid`
    pub const INVALID: SteamApiCall = SteamApiCall(0);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

/// SDK result code (`EResult`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EResult(pub i32);

impl EResult {
    pub const OK: EResult = EResult(1);
    pub const FAIL: EResult = EResult(2);

    pub fn is_ok(self) -> bool {
        self == Self::OK
    }
}

impl std::fmt::Display for EResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EResult({})", self.0)
    }
}

/// Which rows a leaderboard download covers (`ELeaderboardDataRequest`)
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardDataRequest {
    Global = 0,
    GlobalAroundUser = 1,
    Friends = 2,
    Users = 3,
}

/// How an uploaded score interacts with the stored one (`ELeaderboardUploadScoreMethod`)
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardUploadScoreMethod {
    None = 0,
    #[default]
    KeepBest = 1,
    ForceUpdate = 2,
}

/// `ELeaderboardSortMethod`
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardSortMethod {
    None = 0,
    Ascending = 1,
    #[default]
    Descending = 2,
}

/// `ELeaderboardDisplayType`
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardDisplayType {
    None = 0,
    #[default]
    Numeric = 1,
    TimeSeconds = 2,
    TimeMilliSeconds = 3,
}

/// Why the SDK flagged an async call as failed (`ESteamAPICallFailure`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallFailure {
    /// No failure recorded
    None,
    /// The local Steam client went away
    SteamGone,
    /// The backend could not be reached
    NetworkFailure,
    /// The handle is not known to the SDK
    InvalidHandle,
    /// The expected callback id didn't match the call
    MismatchedCallback,
    /// A raw value this crate doesn't know about
    Unknown(i32),
}

impl CallFailure {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            -1 => CallFailure::None,
            0 => CallFailure::SteamGone,
            1 => CallFailure::NetworkFailure,
            2 => CallFailure::InvalidHandle,
            3 => CallFailure::MismatchedCallback,
            other => CallFailure::Unknown(other),
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            CallFailure::None => -1,
            CallFailure::SteamGone => 0,
            CallFailure::NetworkFailure => 1,
            CallFailure::InvalidHandle => 2,
            CallFailure::MismatchedCallback => 3,
            CallFailure::Unknown(raw) => raw,
        }
    }
}

impl std::fmt::Display for CallFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallFailure::None => write!(f, "no failure reason"),
            CallFailure::SteamGone => write!(f, "steam client gone"),
            CallFailure::NetworkFailure => write!(f, "network failure"),
            CallFailure::InvalidHandle => write!(f, "invalid call handle"),
            CallFailure::MismatchedCallback => write!(f, "mismatched callback"),
            CallFailure::Unknown(raw) => write!(f, "unknown failure ({raw})"),
        }
    }
}

/// Rows requested from a leaderboard
///
/// Ranges are inclusive and follow the SDK: for `Global` they are absolute
/// ranks starting at 1, for `GlobalAroundUser` they are offsets from the
/// current user's rank (`-4..=5` gives four above and five below).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardRequest {
    Global { start: i32, end: i32 },
    GlobalAroundUser { start: i32, end: i32 },
    Friends,
    Users(Vec<SteamId>),
}

impl LeaderboardRequest {
    /// The raw data request this scope maps onto
    pub fn data_request(&self) -> LeaderboardDataRequest {
        match self {
            LeaderboardRequest::Global { .. } => LeaderboardDataRequest::Global,
            LeaderboardRequest::GlobalAroundUser { .. } => LeaderboardDataRequest::GlobalAroundUser,
            LeaderboardRequest::Friends => LeaderboardDataRequest::Friends,
            LeaderboardRequest::Users(_) => LeaderboardDataRequest::Users,
        }
    }

    /// Range arguments for the download call; friends and users ignore them
    pub fn range(&self) -> (i32, i32) {
        match self {
            LeaderboardRequest::Global { start, end }
            | LeaderboardRequest::GlobalAroundUser { start, end } => (*start, *end),
            LeaderboardRequest::Friends | LeaderboardRequest::Users(_) => (0, 0),
        }
    }
}

/// The SDK's `k_cLeaderboardDetailsMax`
pub const MAX_SCORE_DETAILS: usize = 64;

/// Auxiliary integers stored alongside a leaderboard score, at most
/// [`MAX_SCORE_DETAILS`] of them
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<i32>", into = "Vec<i32>")]
pub struct ScoreDetails(Vec<i32>);

impl ScoreDetails {
    pub fn new(details: Vec<i32>) -> SteamResult<Self> {
        if details.len() > MAX_SCORE_DETAILS {
            return Err(SteamError::TooManyDetails {
                count: details.len(),
                max: MAX_SCORE_DETAILS,
            });
        }
        Ok(Self(details))
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<i32> {
        self.0
    }
}

impl TryFrom<Vec<i32>> for ScoreDetails {
    type Error = SteamError;

    fn try_from(value: Vec<i32>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScoreDetails> for Vec<i32> {
    fn from(value: ScoreDetails) -> Self {
        value.0
    }
}

#[cfg(test)]
#[path = "types/types_tests.rs"]
mod types_tests;
