//! Global error handling for ctxdump
//!
//! Only precondition failures travel through this type. Per-item failures
//! (an unreadable file, a single failed URL or pane) are logged where they
//! happen and never reach the caller.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::fetch::FetchError;
use crate::tmux::PaneError;

/// Global error type for ctxdump operations
#[derive(Error, Debug)]
pub enum DumpError {
    /// A glob or ignore pattern could not be compiled
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The line filter regex could not be compiled
    #[error("failed to compile regex filter: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// A root directory could not be resolved to an absolute path
    #[error("failed to resolve directory {path:?}: {source}")]
    PathResolution {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// URLs were requested but no API key is configured
    #[error("EXA_API_KEY environment variable is required for URL fetching")]
    MissingApiKey,

    /// Panes were requested but the multiplexer binary is missing
    #[error("{0} is required for pane capture but was not found in PATH")]
    ToolNotFound(String),

    /// Panes were the only source and none could be captured
    #[error("no panes were captured")]
    NoPanesCaptured,

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Remote fetch errors
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Pane capture errors
    #[error(transparent)]
    Pane(#[from] PaneError),

    /// File system and output errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Specialized Result type for ctxdump operations
pub type Result<T> = std::result::Result<T, DumpError>;

/// Creates a DumpError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::DumpError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

impl DumpError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl std::fmt::Display) -> Self {
        DumpError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }
}
