/*!
 * Configuration handling for ctxdump
 */

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use clap_complete::Shell;
use strum::{Display, EnumString};

use crate::ensure;
use crate::error::Result;
use crate::fetch::API_KEY_ENV;

/// Output format of the rendered stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// `<file path='...'>` tags
    #[default]
    Xml,
    /// Fenced code blocks
    Md,
}

/// Command-line arguments for ctxdump
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "dump",
    version = env!("CARGO_PKG_VERSION"),
    about = "Dump text files, web pages and tmux panes for LLM context",
    long_about = "Recursively dumps text files from the given directories, respecting .gitignore and custom ignore rules. \
                  Can also fetch web pages through the Exa API and capture tmux panes. \
                  With no source given, dumps the current directory.",
    after_help = "Environment variables:\n  EXA_API_KEY    required for URL fetching"
)]
pub struct Args {
    /// Directories to scan
    pub directories: Vec<PathBuf>,

    /// Directory to scan (can be repeated)
    #[clap(short = 'd', long = "dir")]
    pub dirs: Vec<PathBuf>,

    /// Glob pattern to include (can be repeated)
    #[clap(short = 'g', long = "glob")]
    pub globs: Vec<String>,

    /// File extension to include (can be repeated)
    #[clap(short = 'e', long = "ext")]
    pub extensions: Vec<String>,

    /// Gitignore-style pattern to exclude (can be repeated)
    #[clap(short = 'i', long = "ignore")]
    pub ignore: Vec<String>,

    /// Skip lines matching this regex
    #[clap(short = 'f', long = "filter")]
    pub filter: Option<String>,

    /// URL to fetch through the Exa API (can be repeated)
    #[clap(short = 'u', long = "url")]
    pub urls: Vec<String>,

    /// Always crawl fresh content instead of using the cache
    #[clap(long)]
    pub live: bool,

    /// Timeout in seconds for each URL fetch
    #[clap(long, default_value = "15")]
    pub timeout: u64,

    /// Output format
    #[clap(short = 'o', long = "out-fmt", value_enum, default_value_t = OutputFormat::Xml)]
    pub out_fmt: OutputFormat,

    /// Tag name used for files in XML output
    #[clap(long = "xml-tag", default_value = "file")]
    pub xml_tag: String,

    /// List file paths only
    #[clap(short = 'l', long = "list")]
    pub list: bool,

    /// Print a directory tree before each directory's files
    #[clap(short = 't', long = "tree")]
    pub tree: bool,

    /// tmux pane to capture: "current", "all", or a tmux target (can be repeated)
    #[clap(short = 'p', long = "pane")]
    pub panes: Vec<String>,

    /// Number of trailing lines to capture per pane (0 for full scrollback)
    #[clap(long = "pane-lines", default_value = "0")]
    pub pane_lines: usize,

    /// Number of threads used to read files
    #[clap(long, default_value = "4")]
    pub threads: usize,

    /// Print a summary table to stderr when done
    #[clap(long)]
    pub stats: bool,

    /// Copy output to the system clipboard
    #[clap(long)]
    pub clip: bool,

    /// Log progress to stderr
    #[clap(short = 'v', long)]
    pub verbose: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Immutable configuration for one invocation
#[derive(Clone, Debug)]
pub struct Config {
    /// Root directories, in submission order
    pub directories: Vec<PathBuf>,
    /// Inclusion globs
    pub globs: Vec<String>,
    /// Inclusion extensions
    pub extensions: Vec<String>,
    /// Extra gitignore-style patterns
    pub ignore_patterns: Vec<String>,
    /// Line exclusion regex
    pub line_filter: Option<String>,
    /// URLs to fetch
    pub urls: Vec<String>,
    pub live_crawl: bool,
    /// Per-request fetch timeout
    pub timeout: Duration,
    /// Exa API key, required only when URLs are fetched
    pub api_key: Option<String>,
    pub format: OutputFormat,
    /// XML tag for file items
    pub tag: String,
    pub list_only: bool,
    pub tree: bool,
    /// Pane selectors
    pub panes: Vec<String>,
    /// Trailing lines per pane, 0 for everything
    pub pane_lines: usize,
    /// Threads used to read file content
    pub num_threads: usize,
    pub stats: bool,
    pub clip: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            globs: Vec::new(),
            extensions: Vec::new(),
            ignore_patterns: Vec::new(),
            line_filter: None,
            urls: Vec::new(),
            live_crawl: false,
            timeout: Duration::from_secs(15),
            api_key: None,
            format: OutputFormat::Xml,
            tag: "file".to_string(),
            list_only: false,
            tree: false,
            panes: Vec::new(),
            pane_lines: 0,
            num_threads: 4,
            stats: false,
            clip: false,
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments and the environment
    pub fn from_args(args: Args) -> Self {
        let mut directories = args.dirs;
        directories.extend(args.directories);

        Self {
            directories,
            globs: args.globs,
            extensions: args.extensions,
            ignore_patterns: args.ignore,
            line_filter: args.filter.filter(|f| !f.is_empty()),
            urls: args.urls,
            live_crawl: args.live,
            timeout: Duration::from_secs(args.timeout),
            api_key: std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()),
            format: args.out_fmt,
            tag: args.xml_tag,
            list_only: args.list,
            tree: args.tree,
            panes: args.panes,
            pane_lines: args.pane_lines,
            num_threads: args.threads,
            stats: args.stats,
            clip: args.clip,
        }
    }

    /// Whether no source at all was requested
    pub fn has_no_sources(&self) -> bool {
        self.directories.is_empty() && self.urls.is_empty() && self.panes.is_empty()
    }

    /// Whether panes are the only requested source
    pub fn panes_only(&self) -> bool {
        !self.panes.is_empty() && self.directories.is_empty() && self.urls.is_empty()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(self.num_threads > 0, Config, "--threads must be at least 1");
        ensure!(!self.timeout.is_zero(), Config, "--timeout must be at least 1 second");
        ensure!(
            is_xml_name(&self.tag),
            Config,
            "invalid XML tag name {:?}",
            self.tag
        );
        Ok(())
    }
}

fn is_xml_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_args_merges_directories() {
        let args = Args::parse_from(["dump", "-d", "src", "docs", "tests", "-g", "*.rs"]);
        let config = Config::from_args(args);

        assert_eq!(
            config.directories,
            vec![
                PathBuf::from("src"),
                PathBuf::from("docs"),
                PathBuf::from("tests")
            ]
        );
        assert_eq!(config.globs, vec!["*.rs".to_string()]);
        assert_eq!(config.format, OutputFormat::Xml);
        assert_eq!(config.tag, "file");
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_markdown_and_panes() {
        let args = Args::parse_from([
            "dump", "-o", "md", "-p", "current", "-p", "all", "--pane-lines", "200",
        ]);
        let config = Config::from_args(args);

        assert_eq!(config.format, OutputFormat::Md);
        assert_eq!(config.panes, vec!["current", "all"]);
        assert_eq!(config.pane_lines, 200);
        assert!(config.panes_only());
    }

    #[test]
    fn test_empty_filter_is_none() {
        let config = Config::from_args(Args::parse_from(["dump", "-f", ""]));
        assert!(config.line_filter.is_none());
        assert!(config.has_no_sources());
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let bad_tag = Config {
            tag: "1file".to_string(),
            ..Config::default()
        };
        assert!(bad_tag.validate().is_err());

        let no_threads = Config {
            num_threads: 0,
            ..Config::default()
        };
        assert!(no_threads.validate().is_err());
    }

    #[test]
    fn test_format_display() {
        assert_eq!(OutputFormat::Md.to_string(), "md");
        assert_eq!("xml".parse::<OutputFormat>().unwrap(), OutputFormat::Xml);
    }
}
