//! Gitignore-style exclusion rules for a single root directory

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::warn;

use crate::error::{DumpError, Result};

/// Version-control metadata directory, always excluded
pub const VCS_DIR: &str = ".git";
/// Ignore file read from each root, always excluded itself
pub const IGNORE_FILE: &str = ".gitignore";

/// Compiled ignore rules for one root: the root's `.gitignore` (if any),
/// caller-supplied patterns, and the two implicit entries.
///
/// Later rules override earlier ones and `!` re-includes, following
/// gitignore precedence.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    matcher: Gitignore,
}

impl IgnoreSet {
    /// Build the ignore set for `root`.
    ///
    /// Only `root/.gitignore` is consulted; nested ignore files are not
    /// merged. Malformed lines inside `.gitignore` are reported and skipped,
    /// while malformed `extra_patterns` are a hard error.
    pub fn build(root: &Path, extra_patterns: &[String]) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(root);

        let ignore_file = root.join(IGNORE_FILE);
        if ignore_file.is_file() {
            if let Some(err) = builder.add(&ignore_file) {
                warn!(path = %ignore_file.display(), error = %err, "skipping malformed ignore rules");
            }
        }

        for pattern in extra_patterns {
            builder
                .add_line(None, pattern)
                .map_err(|e| DumpError::invalid_pattern(pattern, e))?;
        }

        for implicit in [VCS_DIR, IGNORE_FILE] {
            builder
                .add_line(None, implicit)
                .map_err(|e| DumpError::invalid_pattern(implicit, e))?;
        }

        let matcher = builder
            .build()
            .map_err(|e| DumpError::invalid_pattern(&extra_patterns.join(","), e))?;

        Ok(Self { matcher })
    }

    /// Check caller-supplied patterns without touching the filesystem.
    ///
    /// Gitignore syntax is lenient: an unclosed `[` class is taken
    /// literally, as git does. Only patterns the glob grammar cannot parse
    /// at all are rejected, such as an unclosed `{` alternation or a nested
    /// one.
    pub fn validate_patterns(patterns: &[String]) -> Result<()> {
        let mut builder = GitignoreBuilder::new("");
        for pattern in patterns {
            builder
                .add_line(None, pattern)
                .map_err(|e| DumpError::invalid_pattern(pattern, e))?;
        }
        Ok(())
    }

    /// Whether `relative_path` (relative to the root) is excluded.
    ///
    /// A path is also excluded when any of its parent directories is.
    pub fn matches(&self, relative_path: &Path, is_dir: bool) -> bool {
        if relative_path.as_os_str().is_empty() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(relative_path, is_dir)
            .is_ignore()
    }

    /// Number of compiled rules
    pub fn len(&self) -> usize {
        self.matcher.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matcher.is_empty()
    }
}
