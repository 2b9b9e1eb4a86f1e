//! steambridge-dispatch - Poll-driven async call result dispatcher
//!
//! This crate provides:
//! - [`Dispatcher`] the registry of pending SDK calls and its [`Dispatcher::pump`] sweep
//! - [`CallAborted`] / [`AbortReason`] the single non-success outcome of a call
//! - [`CallResultFuture`] for awaiting a call instead of passing continuations

mod dispatcher;
mod future;
mod pending;

#[cfg(test)]
mod testing;

pub use dispatcher::{Dispatcher, PumpSummary};
pub use future::CallResultFuture;
pub use pending::{AbortFn, AbortReason, CallAborted, SuccessFn};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{AbortReason, CallAborted, CallResultFuture, Dispatcher, PumpSummary};
}
