/*!
 * Output rendering for ctxdump
 */

use crate::config::OutputFormat;
use crate::tree::TreeNode;
use crate::types::{Item, PaneItem};

/// Tag used for captured panes in XML output
pub const PANE_TAG: &str = "tmux_pane";

/// Renders items, panes and trees in the configured format
#[derive(Debug, Clone)]
pub struct Renderer {
    format: OutputFormat,
    /// Tag for file items in XML output
    tag: String,
}

impl Renderer {
    /// Create a new renderer
    pub fn new(format: OutputFormat, tag: impl Into<String>) -> Self {
        Self {
            format,
            tag: tag.into(),
        }
    }

    /// Render a file or web item
    pub fn render_item(&self, item: &Item) -> String {
        let content = terminated(&item.content);
        match self.format {
            OutputFormat::Md => format!("```{}\n{}```\n", item.path, content),
            OutputFormat::Xml if item.is_web() => {
                format!("<web url='{}'>\n{}</web>\n", item.path, content)
            }
            OutputFormat::Xml => format!(
                "<{tag} path='{}'>\n{}</{tag}>\n",
                item.path,
                content,
                tag = self.tag
            ),
        }
    }

    /// Render a captured pane
    pub fn render_pane(&self, pane: &PaneItem) -> String {
        let meta = &pane.meta;
        let content = terminated(&pane.content);
        match self.format {
            OutputFormat::Md => format!(
                "<!-- tmux pane {} session={} window={} pane={} -->\n```sh\n{}```\n",
                meta.id, meta.session, meta.window, meta.pane, content
            ),
            OutputFormat::Xml => format!(
                "<{tag} id='{}' session='{}' window='{}' pane='{}'>\n{}</{tag}>\n",
                meta.id,
                meta.session,
                meta.window,
                meta.pane,
                content,
                tag = PANE_TAG
            ),
        }
    }

    /// Render a directory tree
    pub fn render_tree(&self, tree: &TreeNode) -> String {
        let drawing = tree.draw();
        match self.format {
            OutputFormat::Md => format!("```tree\n{}```\n", drawing),
            OutputFormat::Xml => format!("<tree>\n{}</tree>\n", drawing),
        }
    }

    /// Render a bare path for list-only mode
    pub fn render_path(&self, path: &str) -> String {
        format!("{}\n", path)
    }
}

/// Borrow `content` with a trailing newline, adding one only when missing
fn terminated(content: &str) -> std::borrow::Cow<'_, str> {
    if content.is_empty() || content.ends_with('\n') {
        content.into()
    } else {
        format!("{}\n", content).into()
    }
}
