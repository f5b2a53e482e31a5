/*!
 * Inclusion, exclusion and line filters applied while collecting files
 *
 * All three filters are compiled once per invocation (the ignore set once
 * per root) and are read-only afterwards, so they can be shared between
 * scanning threads behind an `Arc`.
 */

mod ignore_set;
mod line;
mod pattern;

pub use ignore_set::{IgnoreSet, IGNORE_FILE, VCS_DIR};
pub use line::LineFilter;
pub use pattern::{compile_globs, file_extension, normalize_extension, PatternFilter};
