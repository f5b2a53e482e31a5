/*!
 * ctxdump - Dump directories, web pages and tmux panes for LLM context
 *
 * Text files under one or more roots, pages fetched through the Exa contents
 * API and captured tmux panes are rendered into a single XML or Markdown
 * stream meant to be pasted into a language model prompt.
 */

pub mod classify;
pub mod clipboard;
pub mod collector;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod pool;
pub mod report;
pub mod scanner;
pub mod tmux;
pub mod tree;
pub mod types;
pub mod utils;
pub mod writer;


pub use collector::Collector;
pub use config::{Args, Config, OutputFormat};
pub use error::{DumpError, Result};
pub use report::{Reporter, RunReport};
pub use scanner::Scanner;
pub use types::{CollectionResult, Item, PaneItem, PaneMeta};
pub use writer::Renderer;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
