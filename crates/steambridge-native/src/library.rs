//! Loading the SDK shared library and resolving the flat API

use libloading::Library;
use std::ffi::{CStr, c_char, c_int, c_void};
use std::path::Path;
use std::sync::Arc;
use steambridge_core::{AppId, SteamError, SteamResult};

use crate::user_stats::NativeUserStats;
use crate::utils::NativeUtils;

/// Platform file name of the SDK library
pub const fn default_library_name() -> &'static str {
    if cfg!(target_os = "windows") {
        if cfg!(target_pointer_width = "64") {
            "steam_api64.dll"
        } else {
            "steam_api.dll"
        }
    } else if cfg!(target_os = "macos") {
        "libsteam_api.dylib"
    } else {
        "libsteam_api.so"
    }
}

/// `SteamErrMsg` is a fixed `char[1024]`
const INIT_ERROR_LEN: usize = 1024;

/// `k_ESteamAPIInitResult_OK`
const INIT_OK: c_int = 0;

pub(crate) type Interface = *mut c_void;

// Lifecycle
type RestartAppIfNecessaryFn = unsafe extern "C" fn(app_id: u32) -> bool;
type InitFlatFn = unsafe extern "C" fn(err_msg: *mut c_char) -> c_int;
type RunCallbacksFn = unsafe extern "C" fn();
type ShutdownFn = unsafe extern "C" fn();
type InterfaceFn = unsafe extern "C" fn() -> Interface;

// ISteamUtils
pub(crate) type GetApiCallResultFn = unsafe extern "C" fn(
    utils: Interface,
    call: u64,
    callback: *mut c_void,
    callback_size: c_int,
    callback_expected: c_int,
    failed: *mut bool,
) -> bool;
pub(crate) type GetApiCallFailureReasonFn = unsafe extern "C" fn(utils: Interface, call: u64) -> c_int;

// ISteamUser
pub(crate) type GetSteamIdFn = unsafe extern "C" fn(user: Interface) -> u64;

// ISteamUserStats
pub(crate) type FindLeaderboardFn = unsafe extern "C" fn(stats: Interface, name: *const c_char) -> u64;
pub(crate) type FindOrCreateLeaderboardFn = unsafe extern "C" fn(
    stats: Interface,
    name: *const c_char,
    sort: c_int,
    display: c_int,
) -> u64;
pub(crate) type GetLeaderboardNameFn =
    unsafe extern "C" fn(stats: Interface, leaderboard: u64) -> *const c_char;
pub(crate) type DownloadLeaderboardEntriesFn = unsafe extern "C" fn(
    stats: Interface,
    leaderboard: u64,
    request: c_int,
    range_start: c_int,
    range_end: c_int,
) -> u64;
pub(crate) type DownloadLeaderboardEntriesForUsersFn = unsafe extern "C" fn(
    stats: Interface,
    leaderboard: u64,
    users: *mut u64,
    user_count: c_int,
) -> u64;
pub(crate) type GetDownloadedLeaderboardEntryFn = unsafe extern "C" fn(
    stats: Interface,
    entries: u64,
    index: c_int,
    entry: *mut c_void,
    details: *mut i32,
    details_max: c_int,
) -> bool;
pub(crate) type UploadLeaderboardScoreFn = unsafe extern "C" fn(
    stats: Interface,
    leaderboard: u64,
    method: c_int,
    score: i32,
    details: *const i32,
    details_count: c_int,
) -> u64;
pub(crate) type RequestGlobalStatsFn = unsafe extern "C" fn(stats: Interface, history_days: c_int) -> u64;
pub(crate) type GetGlobalStatInt64Fn =
    unsafe extern "C" fn(stats: Interface, name: *const c_char, data: *mut i64) -> bool;
pub(crate) type RequestUserStatsFn = unsafe extern "C" fn(stats: Interface, user: u64) -> u64;
pub(crate) type GetStatInt32Fn =
    unsafe extern "C" fn(stats: Interface, name: *const c_char, data: *mut i32) -> bool;
pub(crate) type SetStatInt32Fn = unsafe extern "C" fn(stats: Interface, name: *const c_char, data: i32) -> bool;
pub(crate) type GetAchievementFn =
    unsafe extern "C" fn(stats: Interface, name: *const c_char, achieved: *mut bool) -> bool;
pub(crate) type NamedFlagFn = unsafe extern "C" fn(stats: Interface, name: *const c_char) -> bool;
pub(crate) type StoreStatsFn = unsafe extern "C" fn(stats: Interface) -> bool;

/// Resolve one export into its fn pointer type
macro_rules! resolve {
    ($library:expr, $symbol:literal) => {{
        // SAFETY: the target type matches the declaration in steam_api_flat.h
        let symbol = unsafe { $library.get($symbol) }.map_err(|e| {
            SteamError::SymbolNotFound(format!(
                "{}: {}",
                String::from_utf8_lossy(&$symbol[..$symbol.len() - 1]),
                e
            ))
        })?;
        *symbol
    }};
}

/// Function pointers into the loaded library
///
/// Only valid while the owning [`SteamLibrary`] keeps the library mapped.
#[derive(Clone, Copy)]
pub(crate) struct FlatApi {
    restart_app_if_necessary: RestartAppIfNecessaryFn,
    init_flat: InitFlatFn,
    run_callbacks: RunCallbacksFn,
    shutdown: ShutdownFn,
    steam_utils: InterfaceFn,
    steam_user: InterfaceFn,
    steam_user_stats: InterfaceFn,

    pub(crate) get_api_call_result: GetApiCallResultFn,
    pub(crate) get_api_call_failure_reason: GetApiCallFailureReasonFn,
    pub(crate) get_steam_id: GetSteamIdFn,

    pub(crate) find_leaderboard: FindLeaderboardFn,
    pub(crate) find_or_create_leaderboard: FindOrCreateLeaderboardFn,
    pub(crate) get_leaderboard_name: GetLeaderboardNameFn,
    pub(crate) download_leaderboard_entries: DownloadLeaderboardEntriesFn,
    pub(crate) download_leaderboard_entries_for_users: DownloadLeaderboardEntriesForUsersFn,
    pub(crate) get_downloaded_leaderboard_entry: GetDownloadedLeaderboardEntryFn,
    pub(crate) upload_leaderboard_score: UploadLeaderboardScoreFn,
    pub(crate) request_global_stats: RequestGlobalStatsFn,
    pub(crate) get_global_stat_int64: GetGlobalStatInt64Fn,
    pub(crate) request_user_stats: RequestUserStatsFn,
    pub(crate) get_stat_int32: GetStatInt32Fn,
    pub(crate) set_stat_int32: SetStatInt32Fn,
    pub(crate) get_achievement: GetAchievementFn,
    pub(crate) set_achievement: NamedFlagFn,
    pub(crate) clear_achievement: NamedFlagFn,
    pub(crate) store_stats: StoreStatsFn,
}

impl FlatApi {
    fn resolve(library: &Library) -> SteamResult<Self> {
        Ok(Self {
            restart_app_if_necessary: resolve!(library, b"SteamAPI_RestartAppIfNecessary\0"),
            init_flat: resolve!(library, b"SteamAPI_InitFlat\0"),
            run_callbacks: resolve!(library, b"SteamAPI_RunCallbacks\0"),
            shutdown: resolve!(library, b"SteamAPI_Shutdown\0"),
            steam_utils: resolve!(library, b"SteamAPI_SteamUtils_v010\0"),
            steam_user: resolve!(library, b"SteamAPI_SteamUser_v023\0"),
            steam_user_stats: resolve!(library, b"SteamAPI_SteamUserStats_v013\0"),

            get_api_call_result: resolve!(library, b"SteamAPI_ISteamUtils_GetAPICallResult\0"),
            get_api_call_failure_reason: resolve!(
                library,
                b"SteamAPI_ISteamUtils_GetAPICallFailureReason\0"
            ),
            get_steam_id: resolve!(library, b"SteamAPI_ISteamUser_GetSteamID\0"),

            find_leaderboard: resolve!(library, b"SteamAPI_ISteamUserStats_FindLeaderboard\0"),
            find_or_create_leaderboard: resolve!(
                library,
                b"SteamAPI_ISteamUserStats_FindOrCreateLeaderboard\0"
            ),
            get_leaderboard_name: resolve!(
                library,
                b"SteamAPI_ISteamUserStats_GetLeaderboardName\0"
            ),
            download_leaderboard_entries: resolve!(
                library,
                b"SteamAPI_ISteamUserStats_DownloadLeaderboardEntries\0"
            ),
            download_leaderboard_entries_for_users: resolve!(
                library,
                b"SteamAPI_ISteamUserStats_DownloadLeaderboardEntriesForUsers\0"
            ),
            get_downloaded_leaderboard_entry: resolve!(
                library,
                b"SteamAPI_ISteamUserStats_GetDownloadedLeaderboardEntry\0"
            ),
            upload_leaderboard_score: resolve!(
                library,
                b"SteamAPI_ISteamUserStats_UploadLeaderboardScore\0"
            ),
            request_global_stats: resolve!(
                library,
                b"SteamAPI_ISteamUserStats_RequestGlobalStats\0"
            ),
            get_global_stat_int64: resolve!(
                library,
                b"SteamAPI_ISteamUserStats_GetGlobalStatInt64\0"
            ),
            request_user_stats: resolve!(library, b"SteamAPI_ISteamUserStats_RequestUserStats\0"),
            get_stat_int32: resolve!(library, b"SteamAPI_ISteamUserStats_GetStatInt32\0"),
            set_stat_int32: resolve!(library, b"SteamAPI_ISteamUserStats_SetStatInt32\0"),
            get_achievement: resolve!(library, b"SteamAPI_ISteamUserStats_GetAchievement\0"),
            set_achievement: resolve!(library, b"SteamAPI_ISteamUserStats_SetAchievement\0"),
            clear_achievement: resolve!(library, b"SteamAPI_ISteamUserStats_ClearAchievement\0"),
            store_stats: resolve!(library, b"SteamAPI_ISteamUserStats_StoreStats\0"),
        })
    }
}

/// The loaded SDK library with every flat API export resolved
pub struct SteamLibrary {
    api: FlatApi,
    // Dropped after `api`; keeps the fn pointers above valid
    _library: Library,
}

impl SteamLibrary {
    /// Load the SDK from `path` and resolve all exports up front
    pub fn load(path: impl AsRef<Path>) -> SteamResult<Self> {
        let path = path.as_ref();
        // SAFETY: loading runs the library's initialisers; the caller chooses
        // which SDK build to trust.
        let library = unsafe { Library::new(path) }
            .map_err(|e| SteamError::LibraryLoad(format!("{}: {}", path.display(), e)))?;
        let api = FlatApi::resolve(&library)?;

        tracing::debug!(path = %path.display(), "steam api library loaded");
        Ok(Self {
            api,
            _library: library,
        })
    }

    /// Load [`default_library_name`] through the platform search path
    pub fn load_default() -> SteamResult<Self> {
        Self::load(default_library_name())
    }

    pub(crate) fn api(&self) -> &FlatApi {
        &self.api
    }

    /// Returns true when the Steam client is relaunching the app
    ///
    /// The process should exit promptly in that case.
    pub fn restart_app_if_necessary(&self, app_id: AppId) -> bool {
        // SAFETY: plain value argument; valid before init
        unsafe { (self.api.restart_app_if_necessary)(app_id.raw()) }
    }

    /// `SteamAPI_InitFlat`, surfacing the SDK's error text on failure
    pub fn init(&self) -> SteamResult<()> {
        let mut message = [0 as c_char; INIT_ERROR_LEN];
        // SAFETY: the SDK writes at most INIT_ERROR_LEN bytes including the NUL
        let code = unsafe { (self.api.init_flat)(message.as_mut_ptr()) };
        if code == INIT_OK {
            tracing::info!("steam api initialised");
            return Ok(());
        }

        // Force termination in case the SDK filled the whole buffer
        message[INIT_ERROR_LEN - 1] = 0;
        // SAFETY: NUL-terminated above
        let message = unsafe { CStr::from_ptr(message.as_ptr()) }
            .to_string_lossy()
            .into_owned();
        Err(SteamError::InitFailed { code, message })
    }

    /// Dispatch the SDK's own queued callbacks
    pub fn run_callbacks(&self) {
        // SAFETY: no arguments; the SDK tolerates calls before init
        unsafe { (self.api.run_callbacks)() }
    }

    pub fn shutdown(&self) {
        // SAFETY: no arguments
        unsafe { (self.api.shutdown)() }
        tracing::info!("steam api shut down");
    }

    /// `ISteamUtils` accessor; only valid after [`init`](Self::init)
    pub fn utils(self: &Arc<Self>) -> SteamResult<NativeUtils> {
        let utils = self.interface(self.api.steam_utils, "ISteamUtils")?;
        Ok(NativeUtils::new(self.clone(), utils))
    }

    /// `ISteamUserStats` accessor; only valid after [`init`](Self::init)
    pub fn user_stats(self: &Arc<Self>) -> SteamResult<NativeUserStats> {
        let stats = self.interface(self.api.steam_user_stats, "ISteamUserStats")?;
        let user = self.interface(self.api.steam_user, "ISteamUser")?;
        Ok(NativeUserStats::new(self.clone(), stats, user))
    }

    fn interface(&self, accessor: InterfaceFn, name: &str) -> SteamResult<Interface> {
        // SAFETY: accessors take no arguments and return null before init
        let interface = unsafe { accessor() };
        if interface.is_null() {
            return Err(SteamError::InitFailed {
                code: -1,
                message: format!("{name} interface unavailable, was the SDK initialised?"),
            });
        }
        Ok(interface)
    }
}

impl std::fmt::Debug for SteamLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SteamLibrary").finish_non_exhaustive()
    }
}
