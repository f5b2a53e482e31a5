/*!
 * Directory tree of accepted files
 *
 * The tree is built after a walk from the flat list of accepted relative
 * paths, so directories that end up with no accepted file never get a node.
 */

use std::path::{Component, Path, PathBuf};

/// One filesystem entry in a scanned root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Base name
    pub name: String,
    /// Path of the entry on disk
    pub full_path: PathBuf,
    pub is_directory: bool,
    /// Children in discovery order
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn directory(name: String, full_path: PathBuf) -> Self {
        Self {
            name,
            full_path,
            is_directory: true,
            children: Vec::new(),
        }
    }

    /// Build a tree rooted at `root` from root-relative file paths.
    ///
    /// Paths are inserted in the given order; a directory takes the position
    /// of the first file discovered beneath it.
    pub fn from_paths<'a, I>(root: &Path, files: I) -> Self
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string());
        let mut tree = Self::directory(name, root.to_path_buf());

        for file in files {
            tree.insert(file);
        }
        tree
    }

    fn insert(&mut self, relative: &Path) {
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().to_string()),
                _ => None,
            })
            .collect();

        let Some((file_name, dirs)) = parts.split_last() else {
            return;
        };

        let mut node = self;
        for dir in dirs {
            let index = match node
                .children
                .iter()
                .position(|c| c.is_directory && &c.name == dir)
            {
                Some(index) => index,
                None => {
                    let full_path = node.full_path.join(dir);
                    node.children
                        .push(TreeNode::directory(dir.clone(), full_path));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[index];
        }

        if node
            .children
            .iter()
            .any(|c| !c.is_directory && &c.name == file_name)
        {
            return;
        }
        let full_path = node.full_path.join(file_name);
        node.children.push(TreeNode {
            name: file_name.clone(),
            full_path,
            is_directory: false,
            children: Vec::new(),
        });
    }

    /// Number of file leaves beneath this node
    pub fn file_count(&self) -> usize {
        if self.is_directory {
            self.children.iter().map(TreeNode::file_count).sum()
        } else {
            1
        }
    }

    /// Draw the tree with box-drawing characters, one entry per line
    pub fn draw(&self) -> String {
        let mut out = format!("{}\n", self.name);
        draw_children(&self.children, "", &mut out);
        out
    }
}

fn draw_children(children: &[TreeNode], prefix: &str, out: &mut String) {
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        out.push_str(prefix);
        out.push_str(branch);
        out.push_str(&child.name);
        out.push('\n');
        if child.is_directory {
            draw_children(&child.children, &format!("{}{}", prefix, indent), out);
        }
    }
}
