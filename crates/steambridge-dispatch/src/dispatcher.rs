//! Poll-driven correlation of async SDK calls with their continuations
//!
//! The SDK never pushes results for flat-API async calls. Each call hands back
//! a [`SteamApiCall`] handle, and the result has to be fetched by probing that
//! handle until the SDK reports it finished. [`Dispatcher::pump`] performs one
//! probe per pending call and runs the matching continuation when a call
//! reaches a terminal outcome.
//!
//! ```text
//! register ──► PENDING ──(poll: completed)──► SUCCEEDED  on_success(record)
//!                 │  ▲
//!                 │  └──(poll: pending)
//!                 └─────(poll: failed / deadline / bad buffer)──► ABORTED  on_abort(..)
//! ```
//!
//! # Threading
//!
//! The pending set sits behind one mutex. Continuations always run with the
//! mutex released, on the thread calling `pump`, so a continuation may register
//! the next call of a chain. Such a call joins the set but is only probed from
//! the next pump pass on.

use crate::pending::{AbortFn, AbortReason, CallAborted, PendingCall, SuccessFn};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;
use steambridge_core::{
    CallFailure, CallResult, CallResultSource, CallbackRecord, DispatcherConfig, PollStatus,
    ResultKind, SteamApiCall,
};

/// Counters for one pump pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpSummary {
    /// Calls probed this pass
    pub polled: usize,
    /// Calls whose success continuation ran
    pub succeeded: usize,
    /// Calls whose abort continuation ran
    pub aborted: usize,
    /// Calls left pending afterwards, including ones registered during the pass
    pub still_pending: usize,
}

/// Snapshot of what a pass needs to probe one record without holding the lock
struct Probe {
    ticket: u64,
    call: SteamApiCall,
    kind: ResultKind,
    result_size: usize,
    issued_at: Instant,
}

enum Outcome {
    Pending,
    Succeeded(CallResult),
    Aborted(AbortReason),
}

/// Registry of pending async calls, advanced by [`Dispatcher::pump`]
pub struct Dispatcher {
    source: Arc<dyn CallResultSource>,
    config: DispatcherConfig,
    /// Keyed by registration ticket so iteration follows registration order
    pending: Mutex<BTreeMap<u64, PendingCall>>,
    next_ticket: AtomicU64,
    pumping: AtomicBool,
}

impl Dispatcher {
    /// Create an empty dispatcher polling `source`
    pub fn new(source: Arc<dyn CallResultSource>, config: DispatcherConfig) -> Self {
        Self {
            source,
            config,
            pending: Mutex::new(BTreeMap::new()),
            next_ticket: AtomicU64::new(1),
            pumping: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Track `call` until the SDK reports it finished
    ///
    /// On completion the result buffer of `result_size` bytes is decoded as
    /// `kind` and handed to `on_success`. Every other terminal outcome goes to
    /// `on_abort`. Exactly one of the two runs, once.
    pub fn register_pending_call<S, A>(
        &self,
        call: SteamApiCall,
        kind: ResultKind,
        result_size: usize,
        on_success: S,
        on_abort: A,
    ) where
        S: FnOnce(CallResult) + Send + 'static,
        A: FnOnce(CallAborted) + Send + 'static,
    {
        let on_success: SuccessFn = Box::new(on_success);
        let on_abort: AbortFn = Box::new(on_abort);
        let record = PendingCall::new(call, kind, result_size, on_success, on_abort);
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst);

        let mut pending = self.pending.lock();
        if pending.values().any(|existing| existing.call == call) {
            tracing::warn!(%call, %kind, "call handle registered twice");
        }
        pending.insert(ticket, record);
        tracing::debug!(%call, %kind, pending = pending.len(), "registered pending call");
    }

    /// Typed form of [`register_pending_call`](Self::register_pending_call)
    pub fn register<T, S, A>(&self, call: SteamApiCall, on_success: S, on_abort: A)
    where
        T: CallbackRecord,
        S: FnOnce(T) + Send + 'static,
        A: FnOnce(CallAborted) + Send + 'static,
    {
        let (on_success, on_abort) = typed_continuations::<T, S, A>(call, on_success, on_abort);
        self.register_pending_call(call, T::KIND, T::SIZE, on_success, on_abort);
    }

    /// Probe every pending call once and run continuations for finished ones
    ///
    /// Only calls registered before the pass started are probed. Must not be
    /// called from inside a continuation; such a call is ignored.
    pub fn pump(&self) -> PumpSummary {
        if self.pumping.swap(true, Ordering::AcqRel) {
            tracing::warn!("pump re-entered while a pass is running; ignoring");
            return PumpSummary::default();
        }
        let _pass = PassGuard(&self.pumping);

        let probes: Vec<Probe> = self
            .pending
            .lock()
            .iter()
            .map(|(ticket, record)| Probe {
                ticket: *ticket,
                call: record.call,
                kind: record.kind,
                result_size: record.result_size,
                issued_at: record.issued_at,
            })
            .collect();

        let mut summary = PumpSummary::default();
        for probe in &probes {
            summary.polled += 1;
            match self.poll(probe) {
                Outcome::Pending => {}
                Outcome::Succeeded(result) => {
                    if self.resolve(probe, Ok(result)) {
                        summary.succeeded += 1;
                    }
                }
                Outcome::Aborted(reason) => {
                    if self.resolve(probe, Err(reason)) {
                        summary.aborted += 1;
                    }
                }
            }
        }

        summary.still_pending = self.pending_count();
        if summary.succeeded + summary.aborted > 0 {
            tracing::trace!(?summary, "pump pass finished");
        }
        summary
    }

    /// Number of calls not yet removed
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether `call` is still tracked; true while its continuation runs
    pub fn is_pending(&self, call: SteamApiCall) -> bool {
        self.pending
            .lock()
            .values()
            .any(|record| record.call == call)
    }

    /// Abort every pending call with [`AbortReason::Abandoned`]
    ///
    /// Used at shutdown, once nothing will pump again. Returns how many
    /// continuations ran.
    pub fn abandon_all(&self) -> usize {
        let records = std::mem::take(&mut *self.pending.lock());
        let mut abandoned = 0;
        for (_, mut record) in records {
            if let Some((_, on_abort)) = record.take_continuations() {
                on_abort(CallAborted::new(
                    record.call,
                    record.kind,
                    AbortReason::Abandoned,
                    record.issued_at,
                ));
                abandoned += 1;
            }
        }
        if abandoned > 0 {
            tracing::debug!(abandoned, "abandoned pending calls");
        }
        abandoned
    }

    fn poll(&self, probe: &Probe) -> Outcome {
        let mut buf = vec![0u8; probe.result_size];
        match self.source.poll_call_result(probe.call, probe.kind, &mut buf) {
            PollStatus::Pending => match self.config.call_timeout {
                Some(limit) if probe.issued_at.elapsed() >= limit => {
                    Outcome::Aborted(AbortReason::TimedOut)
                }
                _ => Outcome::Pending,
            },
            PollStatus::Failed => {
                let failure = self.source.call_failure_reason(probe.call);
                Outcome::Aborted(AbortReason::Failed(failure))
            }
            PollStatus::Completed => match CallResult::decode(probe.kind, &buf) {
                Ok(result) => Outcome::Succeeded(result),
                Err(err) => {
                    tracing::error!(call = %probe.call, kind = %probe.kind, "{}", err);
                    Outcome::Aborted(AbortReason::Malformed(err))
                }
            },
        }
    }

    /// Run the terminal continuation for `probe`, then drop the record
    ///
    /// Returns false if the record had already been resolved.
    fn resolve(&self, probe: &Probe, outcome: Result<CallResult, AbortReason>) -> bool {
        let continuations = self
            .pending
            .lock()
            .get_mut(&probe.ticket)
            .and_then(PendingCall::take_continuations);

        let Some((on_success, on_abort)) = continuations else {
            self.pending.lock().remove(&probe.ticket);
            return false;
        };

        match outcome {
            Ok(result) => {
                tracing::debug!(call = %probe.call, kind = %probe.kind, "call succeeded");
                on_success(result);
            }
            Err(reason) => {
                tracing::debug!(call = %probe.call, kind = %probe.kind, %reason, "call aborted");
                on_abort(CallAborted::new(
                    probe.call,
                    probe.kind,
                    reason,
                    probe.issued_at,
                ));
            }
        }

        self.pending.lock().remove(&probe.ticket);
        true
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("pending", &self.pending_count())
            .field("pumping", &self.pumping.load(Ordering::Relaxed))
            .finish()
    }
}

/// Clears the pumping flag even if a continuation panics
struct PassGuard<'a>(&'a AtomicBool);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Wrap typed continuations as the untyped pair the pending set stores
///
/// A result of any kind other than `T::KIND` aborts with
/// `Failed(MismatchedCallback)`, so one of the two always runs.
fn typed_continuations<T, S, A>(
    call: SteamApiCall,
    on_success: S,
    on_abort: A,
) -> (SuccessFn, AbortFn)
where
    T: CallbackRecord,
    S: FnOnce(T) + Send + 'static,
    A: FnOnce(CallAborted) + Send + 'static,
{
    let issued_at = Instant::now();
    let abort = Arc::new(Mutex::new(Some(on_abort)));
    let mismatch = abort.clone();

    let on_success: SuccessFn = Box::new(move |result| match T::from_result(result) {
        Some(record) => on_success(record),
        None => {
            tracing::error!(%call, expected = %T::KIND, "decoded record of another kind");
            let on_abort = mismatch.lock().take();
            if let Some(on_abort) = on_abort {
                on_abort(CallAborted::new(
                    call,
                    T::KIND,
                    AbortReason::Failed(CallFailure::MismatchedCallback),
                    issued_at,
                ));
            }
        }
    });
    let on_abort: AbortFn = Box::new(move |aborted| {
        let on_abort = abort.lock().take();
        if let Some(on_abort) = on_abort {
            on_abort(aborted);
        }
    });
    (on_success, on_abort)
}
