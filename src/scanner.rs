/*!
 * Directory scanning functionality
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::classify::{classify, FileKind};
use crate::error::{DumpError, Result};
use crate::filter::{IgnoreSet, LineFilter, PatternFilter};
use crate::tree::TreeNode;
use crate::types::{CollectionResult, Item, SkipReason, Visit};

/// Resolve a root directory to an absolute, canonical path
pub fn resolve_root(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|source| DumpError::PathResolution {
        path: path.to_path_buf(),
        source,
    })
}

/// Display path of a file: the root's base name joined with the relative path
pub fn display_path(root: &Path, relative: &Path) -> String {
    match root.file_name() {
        Some(name) => Path::new(name).join(relative),
        None => relative.to_path_buf(),
    }
    .to_string_lossy()
    .to_string()
}

/// Scanner for a single root directory.
///
/// Filters are shared read-only between scanners; each scan builds and owns
/// the ignore set of its root.
#[derive(Debug, Clone)]
pub struct Scanner {
    /// Inclusion filter shared across roots
    patterns: Arc<PatternFilter>,
    /// Line filter applied to file content
    lines: Arc<LineFilter>,
    /// Caller-supplied ignore patterns added to every root's ignore set
    ignore_patterns: Arc<[String]>,
    /// Build a tree of accepted files
    build_tree: bool,
    /// Record display paths instead of reading content
    list_only: bool,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(
        patterns: Arc<PatternFilter>,
        lines: Arc<LineFilter>,
        ignore_patterns: impl Into<Arc<[String]>>,
    ) -> Self {
        Self {
            patterns,
            lines,
            ignore_patterns: ignore_patterns.into(),
            build_tree: false,
            list_only: false,
        }
    }

    pub fn with_tree(mut self, build_tree: bool) -> Self {
        self.build_tree = build_tree;
        self
    }

    pub fn with_list_only(mut self, list_only: bool) -> Self {
        self.list_only = list_only;
        self
    }

    /// Scan `root` and return its tree and items.
    ///
    /// Fails only when the root cannot be resolved or the ignore set cannot
    /// be compiled; every per-entry problem just skips that entry.
    pub fn scan(&self, root: &Path) -> Result<CollectionResult> {
        let root = resolve_root(root)?;
        let ignores = IgnoreSet::build(&root, &self.ignore_patterns)?;
        debug!(
            root = %root.display(),
            rules = ignores.len(),
            line_filter = self.lines.is_active(),
            "scanning directory"
        );

        let accepted: Vec<PathBuf> = self
            .walk(&root, &ignores)
            .into_iter()
            .filter(Visit::is_accepted_file)
            .map(|visit| visit.path)
            .collect();

        let tree = self
            .build_tree
            .then(|| TreeNode::from_paths(&root, accepted.iter().map(PathBuf::as_path)));

        if self.list_only {
            return Ok(CollectionResult {
                tree,
                items: Vec::new(),
                paths_only: accepted
                    .iter()
                    .map(|rel| display_path(&root, rel))
                    .collect(),
                unreadable: Vec::new(),
            });
        }

        let (items, unreadable) = self.read_items(&root, &accepted);
        Ok(CollectionResult {
            tree,
            items,
            paths_only: Vec::new(),
            unreadable,
        })
    }

    /// Read accepted files in parallel, keeping discovery order.
    ///
    /// Files that fail to read are logged and returned as `Unreadable`
    /// visits instead of items.
    pub fn read_items(&self, root: &Path, accepted: &[PathBuf]) -> (Vec<Item>, Vec<Visit>) {
        let results: Vec<std::result::Result<Item, Visit>> = accepted
            .par_iter()
            .map(|rel| self.read_item(root, rel))
            .collect();

        let mut items = Vec::with_capacity(results.len());
        let mut unreadable = Vec::new();
        for result in results {
            match result {
                Ok(item) => items.push(item),
                Err(visit) => unreadable.push(visit),
            }
        }
        (items, unreadable)
    }

    /// Walk `root` depth-first in lexicographic order and record what happened
    /// to every entry.
    ///
    /// Ignored directories are recorded once and their subtree is pruned.
    /// Traversed directories are recorded as accepted.
    pub fn walk(&self, root: &Path, ignores: &IgnoreSet) -> Vec<Visit> {
        let mut visits = Vec::new();
        let mut entries = WalkDir::new(root).sort_by_file_name().into_iter();

        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }

            let is_dir = entry.file_type().is_dir();
            let relative = match entry.path().strip_prefix(root) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => {
                    visits.push(Visit {
                        path: entry.path().to_path_buf(),
                        is_dir,
                        skipped: Some(SkipReason::Unresolvable),
                    });
                    continue;
                }
            };

            let skipped = if ignores.matches(&relative, is_dir) {
                if is_dir {
                    entries.skip_current_dir();
                }
                Some(SkipReason::Ignored)
            } else if is_dir {
                None
            } else if classify(entry.path()) == FileKind::Binary {
                Some(SkipReason::Binary)
            } else if !self.patterns.accepts(&relative) {
                Some(SkipReason::Filtered)
            } else {
                None
            };

            visits.push(Visit {
                path: relative,
                is_dir,
                skipped,
            });
        }

        visits
    }

    fn read_item(&self, root: &Path, relative: &Path) -> std::result::Result<Item, Visit> {
        let path = root.join(relative);
        match self.lines.read_file(&path) {
            Ok(content) => Ok(Item::new(display_path(root, relative), content)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read file");
                Err(Visit {
                    path: relative.to_path_buf(),
                    is_dir: false,
                    skipped: Some(SkipReason::Unreadable),
                })
            }
        }
    }
}
