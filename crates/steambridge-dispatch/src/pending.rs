//! Pending call records and their terminal outcomes

use std::time::{Duration, Instant, SystemTime};
use steambridge_core::{CallFailure, CallResult, DecodeError, EResult, ResultKind, SteamApiCall};
use thiserror::Error;

/// Continuation run with the decoded record when a call succeeds
pub type SuccessFn = Box<dyn FnOnce(CallResult) + Send + 'static>;

/// Continuation run when a call finishes without a usable result
pub type AbortFn = Box<dyn FnOnce(CallAborted) + Send + 'static>;

/// Why a call didn't succeed
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The SDK set the failure flag
    #[error("call failed: {0}")]
    Failed(CallFailure),

    /// Still pending when the configured deadline passed
    #[error("deadline exceeded")]
    TimedOut,

    /// The completed buffer couldn't hold the declared record
    #[error("malformed result: {0}")]
    Malformed(DecodeError),

    /// A lookup step completed but the named leaderboard or stat doesn't exist
    #[error("not found")]
    NotFound,

    /// Completed, but the record carries a non-OK result code
    #[error("rejected with {0}")]
    Rejected(EResult),

    /// The record was discarded before any pump resolved it
    #[error("abandoned before completion")]
    Abandoned,
}

/// The single "did not succeed" outcome of a pending call
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} call {call} aborted after {elapsed:?}: {reason}")]
pub struct CallAborted {
    pub call: SteamApiCall,
    pub kind: ResultKind,
    pub reason: AbortReason,
    /// Wall-clock time the outcome was decided
    pub at: SystemTime,
    /// Time spent pending since registration
    pub elapsed: Duration,
}

impl CallAborted {
    pub fn new(
        call: SteamApiCall,
        kind: ResultKind,
        reason: AbortReason,
        issued_at: Instant,
    ) -> Self {
        Self {
            call,
            kind,
            reason,
            at: SystemTime::now(),
            elapsed: issued_at.elapsed(),
        }
    }
}

/// One outstanding async call
///
/// Fixed at registration; the continuations are taken exactly once when the
/// call reaches a terminal outcome.
pub(crate) struct PendingCall {
    pub(crate) call: SteamApiCall,
    pub(crate) kind: ResultKind,
    pub(crate) result_size: usize,
    pub(crate) issued_at: Instant,
    continuations: Option<(SuccessFn, AbortFn)>,
}

impl PendingCall {
    pub(crate) fn new(
        call: SteamApiCall,
        kind: ResultKind,
        result_size: usize,
        on_success: SuccessFn,
        on_abort: AbortFn,
    ) -> Self {
        Self {
            call,
            kind,
            result_size,
            issued_at: Instant::now(),
            continuations: Some((on_success, on_abort)),
        }
    }

    /// Claim the continuations; `None` once the call has been resolved
    pub(crate) fn take_continuations(&mut self) -> Option<(SuccessFn, AbortFn)> {
        self.continuations.take()
    }
}

impl std::fmt::Debug for PendingCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCall")
            .field("call", &self.call)
            .field("kind", &self.kind)
            .field("result_size", &self.result_size)
            .field("issued_at", &self.issued_at)
            .field("resolved", &self.continuations.is_none())
            .finish()
    }
}
