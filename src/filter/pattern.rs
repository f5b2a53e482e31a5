//! Glob and extension inclusion filter

use std::collections::HashSet;
use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::{DumpError, Result};

/// Compile glob patterns into a single matcher.
///
/// `/` is a literal separator: `*` never crosses a directory boundary, so
/// `*.rs` only matches at the root while `**/*.rs` matches at any depth.
pub fn compile_globs(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| DumpError::invalid_pattern(pattern, e.kind()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| DumpError::invalid_pattern(&patterns.join(","), e))
}

/// Lowercase an extension and drop any leading dots (`".RS"` -> `"rs"`)
pub fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

/// Lowercased text after the last `.` of the file name, or `""` without one.
///
/// Unlike [`Path::extension`], a leading dot counts: `.bashrc` has the
/// extension `bashrc`.
pub fn file_extension(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.rfind('.').map(|dot| name[dot + 1..].to_lowercase()))
        .unwrap_or_default()
}

/// Inclusion filter combining globs and extensions with OR semantics.
///
/// An empty filter accepts everything.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    globs: GlobSet,
    extensions: HashSet<String>,
}

impl PatternFilter {
    pub fn new(globs: &[String], extensions: &[String]) -> Result<Self> {
        Ok(Self {
            globs: compile_globs(globs)?,
            extensions: extensions.iter().map(|e| normalize_extension(e)).collect(),
        })
    }

    /// Filter that accepts every path
    pub fn accept_all() -> Self {
        Self {
            globs: GlobSet::empty(),
            extensions: HashSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.globs.is_empty() && self.extensions.is_empty()
    }

    /// Decide whether a root-relative path is included.
    ///
    /// Accepted when any glob matches or the path's extension is in the
    /// extension set (see [`file_extension`]). An empty-string entry in the
    /// set matches files without a dot in their name.
    pub fn accepts(&self, relative_path: &Path) -> bool {
        if self.is_empty() {
            return true;
        }

        if self.globs.is_match(relative_path) {
            return true;
        }

        self.extensions.contains(&file_extension(relative_path))
    }
}

impl Default for PatternFilter {
    fn default() -> Self {
        Self::accept_all()
    }
}
