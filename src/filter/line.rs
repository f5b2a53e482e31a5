//! Regex-based line suppression

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use regex::Regex;

use crate::error::Result;

/// Drops every line matching an optional regex.
///
/// Without a regex content is passed through verbatim, keeping the original
/// line endings. With a regex the content is rebuilt line by line and every
/// kept line is terminated by `\n`.
#[derive(Debug, Clone, Default)]
pub struct LineFilter {
    regex: Option<Regex>,
}

impl LineFilter {
    /// Compile a filter; `None` or an empty pattern disables filtering
    pub fn new(pattern: Option<&str>) -> Result<Self> {
        let regex = match pattern {
            Some(p) if !p.is_empty() => Some(Regex::new(p)?),
            _ => None,
        };
        Ok(Self { regex })
    }

    pub fn is_active(&self) -> bool {
        self.regex.is_some()
    }

    /// Read a file through the filter
    pub fn read_file(&self, path: &Path) -> io::Result<String> {
        let file = File::open(path)?;
        self.apply(BufReader::new(file))
    }

    /// Read all of `reader` through the filter.
    ///
    /// Lines are read without a length cap, so very long lines are kept
    /// whole. Invalid UTF-8 past the classified prefix is replaced with
    /// U+FFFD.
    pub fn apply<R: BufRead>(&self, mut reader: R) -> io::Result<String> {
        let regex = match &self.regex {
            Some(regex) => regex,
            None => {
                let mut raw = Vec::new();
                reader.read_to_end(&mut raw)?;
                return Ok(into_string(raw));
            }
        };

        let mut content = String::new();
        let mut raw = Vec::new();
        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(strip_line_ending(&raw));
            if regex.is_match(&line) {
                continue;
            }
            content.push_str(&line);
            content.push('\n');
        }
        Ok(content)
    }

    /// Filter text that is already in memory
    pub fn apply_str(&self, text: &str) -> String {
        match &self.regex {
            None => text.to_string(),
            Some(regex) => {
                let mut content = String::with_capacity(text.len());
                for line in text.lines() {
                    if !regex.is_match(line) {
                        content.push_str(line);
                        content.push('\n');
                    }
                }
                content
            }
        }
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn into_string(raw: Vec<u8>) -> String {
    match String::from_utf8(raw) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_drops_matching_lines() {
        let filter = LineFilter::new(Some("DROPME")).unwrap();
        let out = filter.apply(Cursor::new("keep\nDROPME\nkeep2\n")).unwrap();
        assert_eq!(out, "keep\nkeep2\n");
    }

    #[test]
    fn test_no_filter_is_verbatim() {
        let filter = LineFilter::new(None).unwrap();
        let input = "a\r\nb\r\nno trailing newline";
        assert_eq!(filter.apply(Cursor::new(input)).unwrap(), input);
    }

    #[test]
    fn test_empty_pattern_disables_filter() {
        let filter = LineFilter::new(Some("")).unwrap();
        assert!(!filter.is_active());
    }

    #[test]
    fn test_filtered_output_normalizes_line_endings() {
        let filter = LineFilter::new(Some("secret")).unwrap();
        let out = filter
            .apply(Cursor::new("Line 1\r\nLine 2 with secret\r\nLine 3"))
            .unwrap();
        assert_eq!(out, "Line 1\nLine 3\n");
    }

    #[test]
    fn test_very_long_line_is_kept_whole() {
        let filter = LineFilter::new(Some("^drop$")).unwrap();
        let long = "x".repeat(11 * 1024 * 1024);
        let input = format!("{}\ndrop\nend\n", long);
        let out = filter.apply(Cursor::new(input)).unwrap();
        assert_eq!(out.len(), long.len() + "\nend\n".len());
        assert!(out.ends_with("\nend\n"));
    }

    #[test]
    fn test_apply_str() {
        let filter = LineFilter::new(Some(r"^\$ ")).unwrap();
        assert_eq!(filter.apply_str("$ ls\nsrc\n$ pwd\n/tmp\n"), "src\n/tmp\n");
        assert_eq!(LineFilter::default().apply_str("as is"), "as is");
    }

    #[test]
    fn test_invalid_regex() {
        assert!(LineFilter::new(Some("(unclosed")).is_err());
    }
}
