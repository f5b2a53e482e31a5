/*!
 * Terminal pane capture through tmux
 *
 * Selectors are resolved to pane ids up front; capture then runs on a small
 * worker pool where each failing pane is reported and skipped.
 */

mod command;
mod error;

pub use command::{Multiplexer, TmuxCli};
pub use error::{PaneError, PaneResult};

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::filter::LineFilter;
use crate::pool::{PoolHandle, WorkerPool};
use crate::types::{PaneItem, PaneMeta};

/// Upper bound on concurrent capture workers
pub const POOL_CAP: usize = 6;

static PANE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^%\d+$").expect("valid pane id regex"));

const META_FORMAT: &str = "#{session_name}\t#{window_index}\t#{pane_index}";

/// Which panes a selector refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneSelector {
    /// The pane the tool was invoked from
    Current,
    /// Every pane in the current window
    All,
    /// Any tmux target string, passed through untouched
    Target(String),
}

impl FromStr for PaneSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "current" => Self::Current,
            "all" => Self::All,
            other => Self::Target(other.to_string()),
        })
    }
}

fn pane_ids(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| PANE_ID.is_match(line))
        .map(str::to_string)
        .collect()
}

fn resolve_one(mux: &dyn Multiplexer, selector: &PaneSelector) -> PaneResult<Vec<String>> {
    let output = match selector {
        PaneSelector::Current => match mux.invoking_pane() {
            Some(pane) => pane,
            None => mux.run(&["display-message", "-p", "#{pane_id}"])?,
        },
        PaneSelector::All => mux.run(&["list-panes", "-F", "#{pane_id}"])?,
        PaneSelector::Target(target) => {
            mux.run(&["display-message", "-p", "-t", target, "#{pane_id}"])?
        }
    };
    Ok(pane_ids(&output))
}

/// Resolve selectors to unique pane ids in first-seen order.
///
/// Fails as a whole only when the multiplexer is missing; selectors that
/// cannot be resolved are returned as errors next to the ids.
pub fn resolve_selectors(
    mux: &dyn Multiplexer,
    selectors: &[String],
) -> PaneResult<(Vec<String>, Vec<PaneError>)> {
    if !mux.is_available() {
        return Err(PaneError::ToolNotFound(mux.name().to_string()));
    }

    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    let mut errors = Vec::new();

    for raw in selectors {
        let selector = match raw.parse::<PaneSelector>() {
            Ok(selector) => selector,
            Err(never) => match never {},
        };
        match resolve_one(mux, &selector) {
            Ok(found) if found.is_empty() => errors.push(PaneError::NoPane(raw.clone())),
            Ok(found) => {
                for id in found {
                    if seen.insert(id.clone()) {
                        ids.push(id);
                    }
                }
            }
            Err(err) => errors.push(err),
        }
    }

    debug!(panes = ids.len(), failed = errors.len(), "resolved pane selectors");
    Ok((ids, errors))
}

/// Session, window and pane index of a pane, in one query
pub fn pane_meta(mux: &dyn Multiplexer, id: &str) -> PaneResult<PaneMeta> {
    let output = mux.run(&["display-message", "-p", "-t", id, META_FORMAT])?;
    let line = output.trim_end_matches(['\r', '\n']);
    let fields: Vec<&str> = line.split('\t').collect();

    match fields.as_slice() {
        [session, window, pane] => Ok(PaneMeta {
            id: id.to_string(),
            session: session.to_string(),
            window: window.to_string(),
            pane: pane.to_string(),
        }),
        _ => Err(PaneError::MalformedMetadata {
            pane: id.to_string(),
            output: line.to_string(),
        }),
    }
}

/// Drop trailing blank lines, keep the last `max_lines` lines (all when 0)
/// and end with exactly one newline.
///
/// Trailing spaces inside the last content line are kept.
pub fn normalize_capture(raw: &str, max_lines: usize) -> String {
    let mut lines: Vec<&str> = raw.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    let start = if max_lines == 0 {
        0
    } else {
        lines.len().saturating_sub(max_lines)
    };

    let mut text = lines[start..].join("\n");
    text.push('\n');
    text
}

/// Capture the text of one pane
pub fn capture_text(mux: &dyn Multiplexer, id: &str, max_lines: usize) -> PaneResult<String> {
    let start = if max_lines == 0 {
        "-".to_string()
    } else {
        format!("-{}", max_lines)
    };
    let raw = mux.run(&["capture-pane", "-p", "-J", "-t", id, "-S", &start])?;
    Ok(normalize_capture(&raw, max_lines))
}

/// Capture one pane with its metadata, applying the line filter
pub fn capture_pane(
    mux: &dyn Multiplexer,
    id: &str,
    max_lines: usize,
    filter: &LineFilter,
) -> PaneResult<PaneItem> {
    let meta = pane_meta(mux, id)?;
    let text = capture_text(mux, id, max_lines)?;
    Ok(PaneItem {
        meta,
        content: filter.apply_str(&text),
    })
}

/// Capture every pane on a pool of `min(POOL_CAP, ids.len())` workers.
///
/// A pane that fails is reported and skipped.
pub fn capture_all(
    mux: Arc<dyn Multiplexer>,
    ids: Vec<String>,
    max_lines: usize,
    filter: Arc<LineFilter>,
) -> PoolHandle<PaneItem> {
    let pool = WorkerPool::new("pane", POOL_CAP.min(ids.len()));
    pool.run(ids, move |_, id| {
        match capture_pane(mux.as_ref(), &id, max_lines, &filter) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(pane = %id, error = %err, "failed to capture pane");
                None
            }
        }
    })
}
