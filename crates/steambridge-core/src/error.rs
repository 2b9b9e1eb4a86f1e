//! Error types for steambridge

use thiserror::Error;

/// Result type alias for steambridge operations
pub type SteamResult<T> = Result<T, SteamError>;

/// Error type for loading, initialising and configuring the SDK binding
#[derive(Error, Debug)]
pub enum SteamError {
    /// The SDK shared library could not be opened
    #[error("failed to load library: {0}")]
    LibraryLoad(String),

    /// A flat API export is missing from the loaded library
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    /// `SteamAPI_InitFlat` returned a non-OK result
    #[error("SDK initialization failed ({code}): {message}")]
    InitFailed { code: i32, message: String },

    /// The Steam client is relaunching the app; the process should exit
    #[error("app must be relaunched through the Steam client")]
    RestartRequired,

    /// A string argument contains an interior NUL byte
    #[error("invalid string argument: {0}")]
    InvalidString(String),

    /// More score details than the SDK accepts
    #[error("too many score details: {count} (max {max})")]
    TooManyDetails { count: usize, max: usize },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl SteamError {
    /// Returns an error code suitable for the host binding
    pub fn error_code(&self) -> u32 {
        match self {
            SteamError::LibraryLoad(_) => 1,
            SteamError::SymbolNotFound(_) => 2,
            SteamError::InitFailed { .. } => 3,
            SteamError::RestartRequired => 4,
            SteamError::InvalidString(_) => 5,
            SteamError::TooManyDetails { .. } => 6,
            SteamError::Config(_) => 7,
        }
    }
}

impl From<serde_json::Error> for SteamError {
    fn from(err: serde_json::Error) -> Self {
        SteamError::Config(err.to_string())
    }
}

/// A result buffer that can't hold the declared record
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{record} buffer too short: expected {expected} bytes, got {actual}")]
    BufferTooShort {
        record: &'static str,
        expected: usize,
        actual: usize,
    },
}
