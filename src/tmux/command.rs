//! Invocation of the tmux command-line interface

use std::env;
use std::process::Command;

use tracing::debug;

use super::error::{PaneError, PaneResult};
use crate::utils::command_exists;

/// Control interface of a terminal multiplexer.
///
/// `run` executes one control command and returns its standard output.
pub trait Multiplexer: Send + Sync {
    /// Name of the control binary, used in diagnostics
    fn name(&self) -> &str;

    /// Whether the control binary can be invoked at all
    fn is_available(&self) -> bool;

    fn run(&self, args: &[&str]) -> PaneResult<String>;

    /// Pane the tool was invoked from, when the environment says so
    fn invoking_pane(&self) -> Option<String> {
        None
    }
}

/// `tmux` driven through its command line
#[derive(Debug, Clone)]
pub struct TmuxCli {
    binary: String,
    invoking_pane: Option<String>,
}

impl TmuxCli {
    /// Use the `tmux` binary from `PATH` and the invoking pane from `TMUX_PANE`
    pub fn from_env() -> Self {
        Self {
            binary: "tmux".to_string(),
            invoking_pane: env::var("TMUX_PANE").ok().filter(|p| !p.is_empty()),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }
}

impl Multiplexer for TmuxCli {
    fn name(&self) -> &str {
        &self.binary
    }

    fn is_available(&self) -> bool {
        command_exists(&self.binary)
    }

    fn run(&self, args: &[&str]) -> PaneResult<String> {
        let command = format!("{} {}", self.binary, args.join(" "));
        debug!(%command, "running");

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|source| PaneError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PaneError::CommandFailed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn invoking_pane(&self) -> Option<String> {
        self.invoking_pane.clone()
    }
}
