/*!
 * Error types for pane capture
 */

use std::io;
use thiserror::Error;

/// Errors that can occur while talking to tmux
#[derive(Error, Debug)]
pub enum PaneError {
    /// The multiplexer binary is not installed
    #[error("{0} not found in PATH")]
    ToolNotFound(String),

    /// The binary could not be started
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The command ran but exited unsuccessfully
    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// Pane metadata did not have the expected shape
    #[error("unexpected pane metadata for {pane}: {output:?}")]
    MalformedMetadata { pane: String, output: String },

    /// A selector resolved to no pane
    #[error("selector {0:?} did not match any pane")]
    NoPane(String),
}

/// Specialized Result type for pane operations
pub type PaneResult<T> = Result<T, PaneError>;
