//! steambridge-native - Steamworks flat API loaded at runtime
//!
//! [`SteamLibrary`] opens the SDK shared library with `libloading` and
//! resolves every export it needs up front. After [`SteamLibrary::init`],
//! [`SteamLibrary::utils`] and [`SteamLibrary::user_stats`] hand out the
//! implementations of the core seam traits.

mod library;
mod user_stats;
mod utils;

pub use library::{SteamLibrary, default_library_name};
pub use user_stats::NativeUserStats;
pub use utils::NativeUtils;
