/*!
 * Core types and data structures for ctxdump
 */

use std::fmt;
use std::path::PathBuf;

use crate::tree::TreeNode;

/// A unit of collected content from a directory or a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Display path (`<root name>/<relative path>`) or absolute URL
    pub path: String,
    /// Full text payload
    pub content: String,
}

impl Item {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Whether this item came from a remote fetch
    pub fn is_web(&self) -> bool {
        self.path.starts_with("http://") || self.path.starts_with("https://")
    }
}

/// Multiplexer metadata attached to a captured pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneMeta {
    /// Pane identifier, e.g. `%3`
    pub id: String,
    /// Session name
    pub session: String,
    /// Window index within the session
    pub window: String,
    /// Pane index within the window
    pub pane: String,
}

impl fmt::Display for PaneMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{} ({})", self.session, self.window, self.pane, self.id)
    }
}

/// Captured content of one terminal pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneItem {
    pub meta: PaneMeta,
    /// Captured text, always ending in exactly one newline
    pub content: String,
}

/// Output of scanning a single root directory
#[derive(Debug, Clone, Default)]
pub struct CollectionResult {
    /// Directory tree of accepted files, when tree building is enabled
    pub tree: Option<TreeNode>,
    /// Collected items in discovery order (empty in list-only mode)
    pub items: Vec<Item>,
    /// Display paths in discovery order (only populated in list-only mode)
    pub paths_only: Vec<String>,
    /// Accepted files whose content could not be read
    pub unreadable: Vec<Visit>,
}

/// Why the walker excluded an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The path could not be made relative to the root
    Unresolvable,
    /// Matched the root's ignore set (directories are pruned)
    Ignored,
    /// Failed text classification
    Binary,
    /// Rejected by the glob/extension filter
    Filtered,
    /// Could not be read after being accepted
    Unreadable,
}

/// One entry seen during a walk and what happened to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    /// Path relative to the scanned root
    pub path: PathBuf,
    pub is_dir: bool,
    /// `None` when the entry was accepted (or is a traversed directory)
    pub skipped: Option<SkipReason>,
}

impl Visit {
    pub fn is_accepted_file(&self) -> bool {
        !self.is_dir && self.skipped.is_none()
    }
}
