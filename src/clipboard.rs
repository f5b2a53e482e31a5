/*!
 * Clipboard support for ctxdump
 *
 * Copies the rendered stream to the first clipboard command available on
 * this machine. Providers are tried in preference order; tmux comes first
 * when running inside a session.
 */

use std::env;
use std::io::{self, Write};
use std::process::{Command, Stdio};

use once_cell::sync::Lazy;
use thiserror::Error;
use tracing::debug;

use crate::utils::command_exists;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{command} exited with {status}")]
    CommandFailed { command: String, status: String },

    #[error("no clipboard command found")]
    NoClipboardFound,
}

pub type ClipboardResult<T> = std::result::Result<T, ClipboardError>;

/// Something that can take text
pub trait Clipboard {
    fn copy_to_clipboard(&self, text: &str) -> ClipboardResult<()>;
}

/// Known clipboard commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardProvider {
    Tmux,
    Wayland,
    Xsel,
    Xclip,
    MacOS,
    Wsl,
    Termux,
}

impl ClipboardProvider {
    /// Program and arguments that read the clipboard text from stdin
    pub fn command(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Tmux => ("tmux", &["load-buffer", "-w", "-"]),
            Self::Wayland => ("wl-copy", &[]),
            Self::Xsel => ("xsel", &["-b", "-i"]),
            Self::Xclip => ("xclip", &["-selection", "clipboard", "-in"]),
            Self::MacOS => ("pbcopy", &[]),
            Self::Wsl => ("clip.exe", &[]),
            Self::Termux => ("termux-clipboard-set", &[]),
        }
    }
}

impl Clipboard for ClipboardProvider {
    fn copy_to_clipboard(&self, text: &str) -> ClipboardResult<()> {
        let (program, args) = self.command();
        pipe_to(program, args, text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Platform {
    MacOS,
    Wsl,
    Linux,
    Android,
    Other,
}

static PLATFORM: Lazy<Platform> = Lazy::new(|| {
    if cfg!(target_os = "macos") {
        Platform::MacOS
    } else if cfg!(target_os = "windows") || env::var_os("WSL_DISTRO_NAME").is_some() {
        Platform::Wsl
    } else if cfg!(target_os = "android") {
        Platform::Android
    } else if cfg!(target_os = "linux") {
        Platform::Linux
    } else {
        Platform::Other
    }
});

/// Providers to try, most preferred first, ignoring availability
fn candidates(platform: Platform, in_tmux: bool) -> Vec<ClipboardProvider> {
    let mut providers = Vec::with_capacity(4);
    if in_tmux {
        providers.push(ClipboardProvider::Tmux);
    }
    match platform {
        Platform::MacOS => providers.push(ClipboardProvider::MacOS),
        Platform::Wsl => providers.push(ClipboardProvider::Wsl),
        Platform::Linux => providers.extend([
            ClipboardProvider::Wayland,
            ClipboardProvider::Xsel,
            ClipboardProvider::Xclip,
        ]),
        Platform::Android => providers.push(ClipboardProvider::Termux),
        Platform::Other => {}
    }
    providers
}

/// First available provider on this machine
pub fn detect() -> Option<ClipboardProvider> {
    let in_tmux = env::var_os("TMUX").is_some();
    candidates(*PLATFORM, in_tmux)
        .into_iter()
        .find(|provider| command_exists(provider.command().0))
}

/// Copy text with the detected provider
pub fn copy_to_clipboard(text: &str) -> ClipboardResult<()> {
    let provider = detect().ok_or(ClipboardError::NoClipboardFound)?;
    debug!(provider = ?provider, bytes = text.len(), "copying to clipboard");
    provider.copy_to_clipboard(text)
}

fn pipe_to(program: &str, args: &[&str], text: &str) -> ClipboardResult<()> {
    let spawn_err = |source| ClipboardError::Spawn {
        command: program.to_string(),
        source,
    };

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(spawn_err)?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).map_err(spawn_err)?;
    }

    let status = child.wait().map_err(spawn_err)?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::CommandFailed {
            command: program.to_string(),
            status: status.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmux_is_preferred_inside_a_session() {
        let providers = candidates(Platform::Linux, true);
        assert_eq!(
            providers,
            vec![
                ClipboardProvider::Tmux,
                ClipboardProvider::Wayland,
                ClipboardProvider::Xsel,
                ClipboardProvider::Xclip,
            ]
        );
        assert_eq!(
            candidates(Platform::MacOS, false),
            vec![ClipboardProvider::MacOS]
        );
        assert!(candidates(Platform::Other, false).is_empty());
    }

    #[test]
    fn test_pipe_to_reports_exit_status() {
        assert!(pipe_to("sh", &["-c", "cat > /dev/null"], "hello").is_ok());
        assert!(matches!(
            pipe_to("sh", &["-c", "cat > /dev/null; exit 3"], "hello"),
            Err(ClipboardError::CommandFailed { .. })
        ));
        assert!(matches!(
            pipe_to("nonexistentcommandxyz", &[], "hello"),
            Err(ClipboardError::Spawn { .. })
        ));
    }
}
