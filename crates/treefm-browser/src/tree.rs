//! Lazily expanded directory tree.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Label of the filesystem root entry.
pub const ROOT_LABEL: &str = "Root";

/// Label of the home directory entry.
pub const HOME_LABEL: &str = "Home";

/// Expansion state of a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Expansion {
    /// Children unknown; render an "expandable" affordance.
    #[default]
    NotExpanded,
    /// Listed, and there were no visible subdirectories (or listing failed).
    ExpandedEmpty,
    /// Listed, with these child directories in sorted order.
    Expanded(Vec<PathBuf>),
}

/// A directory in the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub path: PathBuf,
    expansion: Expansion,
}

impl TreeNode {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            expansion: Expansion::NotExpanded,
        }
    }

    /// Current expansion state.
    pub fn expansion(&self) -> &Expansion {
        &self.expansion
    }

    /// Whether the node has been listed.
    pub fn is_expanded(&self) -> bool {
        self.expansion != Expansion::NotExpanded
    }

    /// Known children; empty until expanded.
    pub fn children(&self) -> &[PathBuf] {
        match &self.expansion {
            Expansion::Expanded(children) => children,
            Expansion::NotExpanded | Expansion::ExpandedEmpty => &[],
        }
    }

    /// Final path component used as the row label.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

/// One visible row of the tree, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub depth: usize,
    pub path: PathBuf,
    pub label: String,
    pub expansion: Expansion,
}

#[derive(Debug, Clone)]
struct TreeRoot {
    path: PathBuf,
    label: String,
}

/// Directory-only tree that lists one level per expansion.
///
/// Nodes are keyed by path. Once expanded a node is never listed again
/// until [`refresh`](Self::refresh); external changes stay invisible until
/// then.
#[derive(Debug, Clone)]
pub struct DirectoryTreeCache {
    roots: Vec<TreeRoot>,
    nodes: HashMap<PathBuf, TreeNode>,
}

impl Default for DirectoryTreeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryTreeCache {
    /// Seed with the filesystem root and the user's home directory.
    pub fn new() -> Self {
        let mut roots = vec![(PathBuf::from("/"), ROOT_LABEL.to_string())];
        if let Some(home) = dirs::home_dir() {
            roots.push((home, HOME_LABEL.to_string()));
        }
        Self::with_roots(roots)
    }

    /// Seed with custom `(path, label)` roots.
    ///
    /// Roots that are not existing directories are skipped, duplicates are
    /// dropped, and every remaining root is expanded immediately.
    pub fn with_roots<P: Into<PathBuf>, L: Into<String>>(
        roots: impl IntoIterator<Item = (P, L)>,
    ) -> Self {
        let mut cache = Self {
            roots: Vec::new(),
            nodes: HashMap::new(),
        };

        for (path, label) in roots {
            let path = path.into();
            if !path.is_dir() || cache.roots.iter().any(|r| r.path == path) {
                continue;
            }
            cache.roots.push(TreeRoot {
                path: path.clone(),
                label: label.into(),
            });
            cache.nodes.insert(path.clone(), TreeNode::new(path));
        }

        cache.expand_roots();
        cache
    }

    fn expand_roots(&mut self) {
        let roots: Vec<PathBuf> = self.roots.iter().map(|r| r.path.clone()).collect();
        for root in roots {
            self.expand(&root);
        }
    }

    /// Root paths in display order.
    pub fn roots(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(|r| r.path.as_path())
    }

    /// Look up a node.
    pub fn node(&self, path: &Path) -> Option<&TreeNode> {
        self.nodes.get(path)
    }

    /// Whether the tree knows about `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.nodes.contains_key(path)
    }

    /// Number of known nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of a known node, without listing.
    pub fn children(&self, path: &Path) -> Option<&[PathBuf]> {
        self.nodes.get(path).map(TreeNode::children)
    }

    /// Expand a known node and return its child directories.
    ///
    /// The first call lists the directory; later calls return the cached
    /// children without touching the filesystem. A directory that cannot be
    /// listed expands to zero children. Returns `None` for unknown paths.
    pub fn expand(&mut self, path: &Path) -> Option<&[PathBuf]> {
        let needs_listing = !self.nodes.get(path)?.is_expanded();

        if needs_listing {
            let expansion = match list_child_directories(path) {
                Ok(children) if children.is_empty() => Expansion::ExpandedEmpty,
                Ok(children) => Expansion::Expanded(children),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "expanding as empty");
                    Expansion::ExpandedEmpty
                }
            };

            for child in expansion_children(&expansion) {
                self.nodes
                    .entry(child.clone())
                    .or_insert_with(|| TreeNode::new(child.clone()));
            }

            if let Some(node) = self.nodes.get_mut(path) {
                node.expansion = expansion;
            }
        }

        self.nodes.get(path).map(TreeNode::children)
    }

    /// Drop every cached listing and re-expand the roots.
    pub fn refresh(&mut self) {
        self.nodes.clear();
        for root in &self.roots {
            self.nodes
                .insert(root.path.clone(), TreeNode::new(root.path.clone()));
        }
        self.expand_roots();
    }

    /// Visible rows: roots and the children of expanded nodes, depth first.
    pub fn rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        for root in &self.roots {
            self.push_rows(&root.path, Some(&root.label), 0, &mut rows);
        }
        rows
    }

    fn push_rows(&self, path: &Path, label: Option<&str>, depth: usize, rows: &mut Vec<TreeRow>) {
        let Some(node) = self.nodes.get(path) else {
            return;
        };

        rows.push(TreeRow {
            depth,
            path: node.path.clone(),
            label: label.map_or_else(|| node.name(), str::to_string),
            expansion: node.expansion.clone(),
        });

        for child in node.children() {
            self.push_rows(child, None, depth + 1, rows);
        }
    }
}

fn expansion_children(expansion: &Expansion) -> &[PathBuf] {
    match expansion {
        Expansion::Expanded(children) => children,
        Expansion::NotExpanded | Expansion::ExpandedEmpty => &[],
    }
}

/// List visible subdirectories of `path`, sorted by name.
///
/// Dot-prefixed entries are skipped; symlinks to directories count as
/// directories. Entries that cannot be inspected are skipped.
fn list_child_directories(path: &Path) -> io::Result<Vec<PathBuf>> {
    let mut children: Vec<(OsString, PathBuf)> = Vec::new();

    for entry in fs::read_dir(path)? {
        let Ok(entry) = entry else {
            continue;
        };
        let name = entry.file_name();
        if name.as_encoded_bytes().starts_with(b".") {
            continue;
        }

        let child = entry.path();
        if fs::metadata(&child).is_ok_and(|m| m.is_dir()) {
            children.push((name, child));
        }
    }

    children.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(children.into_iter().map(|(_, p)| p).collect())
}
