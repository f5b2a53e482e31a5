/*!
 * Text/binary classification of filesystem entries
 */

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Number of leading bytes sampled when classifying a file
pub const SAMPLE_SIZE: usize = 512;

/// Classification outcome for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Binary,
}

/// Classify a file by sampling its first [`SAMPLE_SIZE`] bytes.
///
/// A file is text when the sample is valid UTF-8 and contains no NUL byte.
/// Files that cannot be opened or read are reported as binary so callers can
/// skip them without treating it as an error.
pub fn classify(path: &Path) -> FileKind {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(_) => return FileKind::Binary,
    };

    let mut buffer = Vec::with_capacity(SAMPLE_SIZE);
    if file
        .by_ref()
        .take(SAMPLE_SIZE as u64)
        .read_to_end(&mut buffer)
        .is_err()
    {
        return FileKind::Binary;
    }

    classify_bytes(&buffer)
}

/// Classify an already-read sample
pub fn classify_bytes(sample: &[u8]) -> FileKind {
    if sample.contains(&0) || std::str::from_utf8(sample).is_err() {
        FileKind::Binary
    } else {
        FileKind::Text
    }
}
