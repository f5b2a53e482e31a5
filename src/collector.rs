/*!
 * Collection orchestrator
 *
 * Directories, URLs and panes are collected concurrently and emitted in a
 * fixed order: directory results as each root finishes, then panes, then
 * web pages.
 */

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{DumpError, Result};
use crate::fetch::{self, ContentApi, ExaClient, FetchOptions, LiveCrawl};
use crate::filter::{IgnoreSet, LineFilter, PatternFilter};
use crate::pool::{PoolHandle, WorkerPool};
use crate::report::{RunReport, SourceKind};
use crate::scanner::{resolve_root, Scanner};
use crate::tmux::{self, Multiplexer, TmuxCli};
use crate::types::{CollectionResult, Item, PaneItem};
use crate::writer::Renderer;

/// Runs one invocation from an immutable [`Config`]
pub struct Collector {
    config: Config,
    renderer: Renderer,
    scanner: Scanner,
    line_filter: Arc<LineFilter>,
    /// Resolved roots in submission order
    roots: Vec<PathBuf>,
    api: Option<Arc<dyn ContentApi>>,
    mux: Option<Arc<dyn Multiplexer>>,
}

impl Collector {
    /// Compile filters and check every precondition.
    ///
    /// Nothing is written before this succeeds: malformed globs, ignore
    /// patterns or regex, unresolvable roots and a missing API key all fail
    /// here.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let patterns = Arc::new(PatternFilter::new(&config.globs, &config.extensions)?);
        let line_filter = Arc::new(LineFilter::new(config.line_filter.as_deref())?);
        IgnoreSet::validate_patterns(&config.ignore_patterns)?;

        let requested = if config.has_no_sources() {
            vec![PathBuf::from(".")]
        } else {
            config.directories.clone()
        };
        let roots = requested
            .iter()
            .map(|dir| resolve_root(dir))
            .collect::<Result<Vec<_>>>()?;

        let api: Option<Arc<dyn ContentApi>> = if config.urls.is_empty() || config.list_only {
            None
        } else {
            let key = config.api_key.clone().ok_or(DumpError::MissingApiKey)?;
            Some(Arc::new(ExaClient::new(key, config.timeout)?))
        };

        let mux: Option<Arc<dyn Multiplexer>> = if config.panes.is_empty() {
            None
        } else {
            Some(Arc::new(TmuxCli::from_env()))
        };

        let scanner = Scanner::new(
            patterns,
            Arc::clone(&line_filter),
            config.ignore_patterns.clone(),
        )
        .with_tree(config.tree)
        .with_list_only(config.list_only);

        Ok(Self {
            renderer: Renderer::new(config.format, config.tag.clone()),
            config,
            scanner,
            line_filter,
            roots,
            api,
            mux,
        })
    }

    /// Replace the remote content source
    pub fn with_content_api(mut self, api: Arc<dyn ContentApi>) -> Self {
        if !self.config.urls.is_empty() && !self.config.list_only {
            self.api = Some(api);
        }
        self
    }

    /// Replace the terminal multiplexer
    pub fn with_multiplexer(mut self, mux: Arc<dyn Multiplexer>) -> Self {
        if !self.config.panes.is_empty() {
            self.mux = Some(mux);
        }
        self
    }

    /// Resolved root directories
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Collect every source and write the rendered stream to `out`
    pub fn run<W: Write>(&self, out: &mut W) -> Result<RunReport> {
        let started = Instant::now();
        let mut report = RunReport {
            directories: self.roots.len(),
            ..RunReport::default()
        };

        // Pane selectors are resolved first so a missing tmux fails the run
        // before anything is written.
        let pane_ids = self.resolve_panes()?;

        let directories = self.spawn_directories();
        let panes = self.spawn_panes(&pane_ids);
        let pages = self.spawn_pages();

        for result in directories.iter() {
            self.emit_directory(&result, out, &mut report)?;
        }

        if self.config.list_only {
            for id in &pane_ids {
                out.write_all(self.renderer.render_path(id).as_bytes())?;
                report.listed += 1;
            }
            for url in &self.config.urls {
                out.write_all(self.renderer.render_path(url).as_bytes())?;
                report.listed += 1;
            }
        }

        if let Some(panes) = panes {
            for pane in panes.iter() {
                out.write_all(self.renderer.render_pane(&pane).as_bytes())?;
                report.record(SourceKind::Pane, &pane.content);
            }
        }

        if let Some(pages) = pages {
            for page in pages.iter() {
                out.write_all(self.renderer.render_item(&page).as_bytes())?;
                report.record(SourceKind::Web, &page.content);
            }
        }
        out.flush()?;

        report.duration = started.elapsed();
        debug!(
            items = report.items(),
            unreadable = report.unreadable,
            elapsed = ?report.duration,
            "collection finished"
        );

        if self.config.panes_only() {
            let collected = if self.config.list_only {
                pane_ids.len()
            } else {
                report.panes
            };
            if collected == 0 {
                return Err(DumpError::NoPanesCaptured);
            }
        }

        Ok(report)
    }

    fn resolve_panes(&self) -> Result<Vec<String>> {
        let Some(mux) = &self.mux else {
            return Ok(Vec::new());
        };
        if !mux.is_available() {
            return Err(DumpError::ToolNotFound(mux.name().to_string()));
        }

        let (ids, errors) = tmux::resolve_selectors(mux.as_ref(), &self.config.panes)?;
        for err in errors {
            warn!(error = %err, "failed to resolve pane selector");
        }
        Ok(ids)
    }

    fn spawn_directories(&self) -> PoolHandle<CollectionResult> {
        let scanner = self.scanner.clone();
        WorkerPool::new("scan", self.roots.len()).run(self.roots.clone(), move |_, root| {
            match scanner.scan(&root) {
                Ok(result) => Some(result),
                Err(err) => {
                    warn!(root = %root.display(), error = %err, "failed to scan directory");
                    None
                }
            }
        })
    }

    fn spawn_panes(&self, ids: &[String]) -> Option<PoolHandle<PaneItem>> {
        if self.config.list_only || ids.is_empty() {
            return None;
        }
        let mux = Arc::clone(self.mux.as_ref()?);
        Some(tmux::capture_all(
            mux,
            ids.to_vec(),
            self.config.pane_lines,
            Arc::clone(&self.line_filter),
        ))
    }

    fn spawn_pages(&self) -> Option<PoolHandle<Item>> {
        let api = Arc::clone(self.api.as_ref()?);
        debug!(urls = self.config.urls.len(), "fetching URLs");
        let options = FetchOptions {
            live: LiveCrawl::from_flag(self.config.live_crawl),
            ..FetchOptions::default()
        };
        Some(fetch::fetch_all(api, self.config.urls.clone(), options))
    }

    fn emit_directory<W: Write>(
        &self,
        result: &CollectionResult,
        out: &mut W,
        report: &mut RunReport,
    ) -> Result<()> {
        if let Some(tree) = &result.tree {
            debug!(root = %tree.name, files = tree.file_count(), "rendering tree");
            out.write_all(self.renderer.render_tree(tree).as_bytes())?;
        }
        for path in &result.paths_only {
            out.write_all(self.renderer.render_path(path).as_bytes())?;
            report.listed += 1;
        }
        for item in &result.items {
            out.write_all(self.renderer.render_item(item).as_bytes())?;
            report.record(SourceKind::File, &item.content);
        }
        report.unreadable += result.unreadable.len();
        Ok(())
    }
}
