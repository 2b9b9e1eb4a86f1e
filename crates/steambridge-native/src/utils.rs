//! `ISteamUtils` call result retrieval

use crate::library::{Interface, SteamLibrary};
use std::ffi::{c_int, c_void};
use std::sync::Arc;
use steambridge_core::{CallFailure, CallResultSource, PollStatus, ResultKind, SteamApiCall};

/// [`CallResultSource`] backed by `SteamAPI_ISteamUtils_GetAPICallResult`
pub struct NativeUtils {
    library: Arc<SteamLibrary>,
    utils: Interface,
}

// SAFETY: the flat API interface pointers are process-global singletons and
// the SDK serialises access to them internally.
unsafe impl Send for NativeUtils {}
unsafe impl Sync for NativeUtils {}

impl NativeUtils {
    pub(crate) fn new(library: Arc<SteamLibrary>, utils: Interface) -> Self {
        Self { library, utils }
    }
}

impl CallResultSource for NativeUtils {
    fn poll_call_result(
        &self,
        call: SteamApiCall,
        expected: ResultKind,
        buf: &mut [u8],
    ) -> PollStatus {
        let Ok(size) = c_int::try_from(buf.len()) else {
            tracing::error!(%call, len = buf.len(), "result buffer exceeds c_int");
            return PollStatus::Failed;
        };
        let mut failed = false;
        // SAFETY: buf is writable for `size` bytes and outlives the call
        let completed = unsafe {
            (self.library.api().get_api_call_result)(
                self.utils,
                call.raw(),
                buf.as_mut_ptr().cast::<c_void>(),
                size,
                expected.callback_id(),
                &mut failed,
            )
        };
        PollStatus::from_raw(completed, failed)
    }

    fn call_failure_reason(&self, call: SteamApiCall) -> CallFailure {
        // SAFETY: plain value arguments
        let raw = unsafe { (self.library.api().get_api_call_failure_reason)(self.utils, call.raw()) };
        CallFailure::from_raw(raw)
    }
}

impl std::fmt::Debug for NativeUtils {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeUtils").finish_non_exhaustive()
    }
}
