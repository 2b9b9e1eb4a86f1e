//! Scripted call result source for dispatcher tests

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use steambridge_core::{CallFailure, CallResultSource, PollStatus, ResultKind, SteamApiCall};

/// What the next poll of a call reports
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Pending,
    Fail(CallFailure),
    Complete(Vec<u8>),
}

/// Replays a per-call script; calls with an exhausted script stay pending
#[derive(Default)]
pub(crate) struct ScriptedSource {
    script: Mutex<HashMap<SteamApiCall, VecDeque<Step>>>,
    failures: Mutex<HashMap<SteamApiCall, CallFailure>>,
    polls: Mutex<Vec<SteamApiCall>>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, call: SteamApiCall, step: Step) {
        self.script.lock().entry(call).or_default().push_back(step);
    }

    pub(crate) fn polls(&self) -> Vec<SteamApiCall> {
        self.polls.lock().clone()
    }

    pub(crate) fn poll_count(&self, call: SteamApiCall) -> usize {
        self.polls.lock().iter().filter(|c| **c == call).count()
    }
}

impl CallResultSource for ScriptedSource {
    fn poll_call_result(
        &self,
        call: SteamApiCall,
        _expected: ResultKind,
        buf: &mut [u8],
    ) -> PollStatus {
        self.polls.lock().push(call);
        let step = self
            .script
            .lock()
            .get_mut(&call)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Step::Pending);
        match step {
            Step::Pending => PollStatus::Pending,
            Step::Fail(reason) => {
                self.failures.lock().insert(call, reason);
                PollStatus::Failed
            }
            Step::Complete(bytes) => {
                let len = bytes.len().min(buf.len());
                buf[..len].copy_from_slice(&bytes[..len]);
                PollStatus::Completed
            }
        }
    }

    fn call_failure_reason(&self, call: SteamApiCall) -> CallFailure {
        self.failures
            .lock()
            .get(&call)
            .copied()
            .unwrap_or(CallFailure::None)
    }
}
