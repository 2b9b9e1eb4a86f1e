//! Future-based view over a pending call
//!
//! The future still only makes progress when something calls
//! [`Dispatcher::pump`]; awaiting it does not poll the SDK.

use crate::dispatcher::Dispatcher;
use crate::pending::{AbortReason, CallAborted};
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use steambridge_core::{CallbackRecord, SteamApiCall};
use tokio::sync::oneshot;

type Reply<T> = oneshot::Sender<Result<T, CallAborted>>;

/// Resolves when a pump pass decides the outcome of `call`
#[must_use = "futures do nothing unless awaited"]
pub struct CallResultFuture<T: CallbackRecord> {
    call: SteamApiCall,
    issued_at: Instant,
    receiver: oneshot::Receiver<Result<T, CallAborted>>,
}

impl<T: CallbackRecord> CallResultFuture<T> {
    pub fn call(&self) -> SteamApiCall {
        self.call
    }
}

impl<T: CallbackRecord> Future for CallResultFuture<T> {
    type Output = Result<T, CallAborted>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // Both continuations were dropped unrun: the dispatcher went away
            Poll::Ready(Err(_)) => Poll::Ready(Err(CallAborted::new(
                this.call,
                T::KIND,
                AbortReason::Abandoned,
                this.issued_at,
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Dispatcher {
    /// Register `call` and return a future for its outcome
    pub fn call_result<T: CallbackRecord>(&self, call: SteamApiCall) -> CallResultFuture<T> {
        let (sender, receiver) = oneshot::channel();
        let on_success = Arc::new(Mutex::new(Some::<Reply<T>>(sender)));
        let on_abort = on_success.clone();

        self.register::<T, _, _>(
            call,
            move |record| send(&on_success, Ok(record)),
            move |aborted| send(&on_abort, Err(aborted)),
        );

        CallResultFuture {
            call,
            issued_at: Instant::now(),
            receiver,
        }
    }
}

fn send<T>(slot: &Mutex<Option<Reply<T>>>, outcome: Result<T, CallAborted>) {
    if let Some(sender) = slot.lock().take() {
        // The caller may have dropped the future; nothing to deliver to then
        let _ = sender.send(outcome);
    }
}
