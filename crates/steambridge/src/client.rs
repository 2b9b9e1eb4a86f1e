//! Owning entry point tying the SDK library, dispatcher and workflows together

use crate::user_stats::UserStats;
use std::sync::Arc;
use steambridge_core::{
    AppId, BridgeConfig, CallResultSource, SteamError, SteamResult, UserStatsSdk,
};
use steambridge_dispatch::{Dispatcher, PumpSummary};
use steambridge_native::SteamLibrary;

/// An initialised SDK session
///
/// The host owns it and must call [`run_callbacks`](Self::run_callbacks)
/// regularly, e.g. once per frame. No async call makes progress otherwise.
pub struct SteamClient {
    library: Arc<SteamLibrary>,
    dispatcher: Arc<Dispatcher>,
    user_stats: UserStats,
}

impl SteamClient {
    /// Load and initialise the SDK described by `config`
    ///
    /// Returns [`SteamError::RestartRequired`] when `restart_if_necessary` is
    /// set and the Steam client is relaunching the app.
    pub fn init(config: BridgeConfig) -> SteamResult<Self> {
        config.validate()?;
        steambridge_logging::init_logging(config.log_level());

        let library = match &config.library_path {
            Some(path) => SteamLibrary::load(path)?,
            None => SteamLibrary::load_default()?,
        };
        let library = Arc::new(library);

        if config.restart_if_necessary
            && let Some(app_id) = config.app_id
            && library.restart_app_if_necessary(AppId(app_id))
        {
            tracing::info!(app_id, "relaunching through the Steam client");
            return Err(SteamError::RestartRequired);
        }

        library.init()?;
        let interfaces = library
            .utils()
            .and_then(|utils| Ok((utils, library.user_stats()?)));
        let (utils, stats) = match interfaces {
            Ok(interfaces) => interfaces,
            Err(e) => {
                library.shutdown();
                return Err(e);
            }
        };

        let source: Arc<dyn CallResultSource> = Arc::new(utils);
        let sdk: Arc<dyn UserStatsSdk> = Arc::new(stats);
        let dispatcher = Arc::new(Dispatcher::new(source, config.dispatcher_config()));
        let user_stats = UserStats::new(sdk, dispatcher.clone());

        tracing::info!(app_id = ?config.app_id, "steam client ready");
        Ok(Self {
            library,
            dispatcher,
            user_stats,
        })
    }

    /// Run the SDK's callbacks, then one dispatcher pass
    ///
    /// Continuations run on the calling thread before this returns.
    pub fn run_callbacks(&self) -> PumpSummary {
        self.library.run_callbacks();
        self.dispatcher.pump()
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn user_stats(&self) -> &UserStats {
        &self.user_stats
    }

    /// Abort outstanding calls with `Abandoned` and shut the SDK down
    pub fn shutdown(self) {
        let abandoned = self.dispatcher.abandon_all();
        if abandoned > 0 {
            tracing::warn!(abandoned, "shutting down with calls still pending");
        }
        self.library.shutdown();
    }
}

impl std::fmt::Debug for SteamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SteamClient")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
