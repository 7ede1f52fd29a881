//! Read-only disclosure view over a backend-computed Merkle tree
//!
//! Nothing here hashes or verifies; the view borrows the fetched payload and
//! keeps only which nodes the user has expanded or collapsed.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use voketag_core::{Error, MerkleNode, MerkleTreeResponse, Result};

/// Above this many leaves only the root summary is rendered
pub const MAX_LEAVES_FOR_FULL_TREE: usize = 16;

/// Nodes shallower than this start expanded
pub const DEFAULT_EXPANDED_DEPTH: usize = 2;

const HASH_LABEL_LEN: usize = 10;
const PRODUCT_LABEL_LEN: usize = 6;
const HEADER_ROOT_LEN: usize = 16;
const SUMMARY_ROOT_LEN: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Left,
    Right,
}

/// Steps from the root to a node, written `L`/`R` (root is the empty path)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<Branch>);

impl NodePath {
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn child(&self, branch: Branch) -> Self {
        let mut steps = self.0.clone();
        steps.push(branch);
        Self(steps)
    }

    /// Follow this path from `root`
    #[must_use]
    pub fn resolve<'a>(&self, root: &'a MerkleNode) -> Option<&'a MerkleNode> {
        self.0.iter().try_fold(root, |node, step| match step {
            Branch::Left => node.left.as_deref(),
            Branch::Right => node.right.as_deref(),
        })
    }
}

impl FromStr for NodePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.chars()
            .map(|c| match c.to_ascii_uppercase() {
                'L' => Ok(Branch::Left),
                'R' => Ok(Branch::Right),
                other => Err(Error::validation(
                    "path",
                    format!("expected L or R, got '{other}'"),
                )),
            })
            .collect::<Result<Vec<_>>>()
            .map(NodePath)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.0 {
            f.write_str(match step {
                Branch::Left => "L",
                Branch::Right => "R",
            })?;
        }
        Ok(())
    }
}

/// One visible node of a full rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNode {
    pub path: NodePath,
    pub hash: String,
    pub label: String,
    pub product_id: Option<String>,
    /// `None` for leaves, which cannot be toggled
    pub expanded: Option<bool>,
}

impl RenderedNode {
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.depth()
    }

    #[must_use]
    pub fn is_toggle(&self) -> bool {
        self.expanded.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendering {
    /// No tree in the payload
    Unavailable,
    /// Small tree: every visible node in pre-order
    Full {
        root: Option<String>,
        leaves: usize,
        nodes: Vec<RenderedNode>,
    },
    /// Large tree: root only
    Summary { root: Option<String>, leaves: usize },
}

/// Disclosure state over a borrowed tree
#[derive(Debug, Clone)]
pub struct MerkleTreeView<'a> {
    tree: Option<&'a MerkleNode>,
    merkle_root: Option<&'a str>,
    leaves_count: usize,
    /// Paths whose expansion differs from the depth-based default
    toggled: HashSet<NodePath>,
}

impl<'a> MerkleTreeView<'a> {
    #[must_use]
    pub fn new(tree: Option<&'a MerkleNode>, merkle_root: Option<&'a str>, leaves_count: usize) -> Self {
        Self {
            tree,
            merkle_root,
            leaves_count,
            toggled: HashSet::new(),
        }
    }

    #[must_use]
    pub fn from_response(response: &'a MerkleTreeResponse) -> Self {
        Self::new(
            response.tree.as_ref(),
            response.merkle_root.as_deref(),
            response.leaves.len(),
        )
    }

    #[must_use]
    pub fn shows_full_tree(&self) -> bool {
        self.leaves_count <= MAX_LEAVES_FOR_FULL_TREE
    }

    #[must_use]
    pub fn is_expanded(&self, path: &NodePath) -> bool {
        (path.depth() < DEFAULT_EXPANDED_DEPTH) != self.toggled.contains(path)
    }

    /// Flip a node with children. Returns `false` when `path` does not name such a node.
    pub fn toggle(&mut self, path: &NodePath) -> bool {
        let has_children = self
            .tree
            .and_then(|root| path.resolve(root))
            .is_some_and(|node| !node.is_leaf());
        if !has_children {
            return false;
        }
        if !self.toggled.remove(path) {
            self.toggled.insert(path.clone());
        }
        true
    }

    #[must_use]
    pub fn render(&self) -> Rendering {
        let Some(root) = self.tree else {
            return Rendering::Unavailable;
        };
        let merkle_root = self.merkle_root.map(str::to_string);
        if !self.shows_full_tree() {
            return Rendering::Summary {
                root: merkle_root,
                leaves: self.leaves_count,
            };
        }

        let mut nodes = Vec::new();
        self.collect(root, NodePath::root(), &mut nodes);
        Rendering::Full {
            root: merkle_root,
            leaves: self.leaves_count,
            nodes,
        }
    }

    fn collect(&self, node: &MerkleNode, path: NodePath, out: &mut Vec<RenderedNode>) {
        let expanded = (!node.is_leaf()).then(|| self.is_expanded(&path));
        out.push(RenderedNode {
            path: path.clone(),
            hash: node.hash.clone(),
            label: truncate(&node.hash, HASH_LABEL_LEN),
            product_id: node.product_id.clone(),
            expanded,
        });
        if expanded == Some(true) {
            if let Some(left) = node.left.as_deref() {
                self.collect(left, path.child(Branch::Left), out);
            }
            if let Some(right) = node.right.as_deref() {
                self.collect(right, path.child(Branch::Right), out);
            }
        }
    }

    /// Plain-text rendering for the terminal
    #[must_use]
    pub fn render_text(&self) -> String {
        match self.render() {
            Rendering::Unavailable => "Árvore Merkle indisponível".to_string(),
            Rendering::Summary { root, leaves } => {
                let mut out = header(root.as_deref(), leaves);
                out.push_str(&format!(
                    "\nÁrvore com {leaves} folhas: visualização simplificada (root acima)\n"
                ));
                out.push_str(&format!(
                    "Root: {}",
                    root.as_deref()
                        .map_or_else(|| "-".to_string(), |r| truncate(r, SUMMARY_ROOT_LEN))
                ));
                out
            }
            Rendering::Full { root, leaves, nodes } => {
                let mut out = header(root.as_deref(), leaves);
                for node in nodes {
                    out.push('\n');
                    out.push_str(&"  ".repeat(node.depth()));
                    out.push_str(match node.expanded {
                        Some(true) => "▼ ",
                        Some(false) => "▶ ",
                        None => "● ",
                    });
                    out.push_str(&node.label);
                    if let Some(pid) = &node.product_id {
                        out.push_str(&format!(" ({})", truncate(pid, PRODUCT_LABEL_LEN)));
                    }
                    if node.is_toggle() {
                        out.push_str(&format!("  [{}]", display_path(&node.path)));
                    }
                }
                out
            }
        }
    }
}

fn header(root: Option<&str>, leaves: usize) -> String {
    format!(
        "Root: {} • {leaves} folhas",
        root.map_or_else(|| "-".to_string(), |r| truncate(r, HEADER_ROOT_LEN))
    )
}

fn display_path(path: &NodePath) -> String {
    if path.depth() == 0 {
        "root".to_string()
    } else {
        path.to_string()
    }
}

/// First `len` characters followed by `…`, or the whole string if short enough
#[must_use]
pub fn truncate(s: &str, len: usize) -> String {
    if s.chars().count() <= len {
        s.to_string()
    } else {
        let head: String = s.chars().take(len).collect();
        format!("{head}…")
    }
}
