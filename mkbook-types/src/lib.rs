//! Shared types for mkbook
//!
//! This crate provides the navigation tree handed over by the authoring
//! side: an arena of pages and sections addressed by [`NodeId`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Node identifier (index into a [`NavTree`] arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        NodeId(index)
    }
}

/// Source document backing a page node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSource {
    /// Path relative to the docs directory (e.g. `guide/intro.md`)
    pub src_path: PathBuf,

    /// Raw page content
    pub content: String,
}

impl PageSource {
    /// File stem of the source path (`index` for `guide/index.md`)
    pub fn stem(&self) -> &str {
        self.src_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }
}

/// Kind of navigation node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum NodeKind {
    Page(PageSource),
    Section,
}

/// A page or section of the navigation tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavNode {
    pub title: String,
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    /// Upward link, for lookups only
    pub parent: Option<NodeId>,
}

impl NavNode {
    pub fn is_page(&self) -> bool {
        matches!(self.kind, NodeKind::Page(_))
    }

    pub fn page(&self) -> Option<&PageSource> {
        match &self.kind {
            NodeKind::Page(page) => Some(page),
            NodeKind::Section => None,
        }
    }
}

/// Arena-backed forest of navigation nodes
///
/// Nodes are appended and never removed, so a [`NodeId`] stays valid for the
/// lifetime of the tree. Top-level nodes keep their insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavTree {
    nodes: Vec<NavNode>,
    roots: Vec<NodeId>,
}

impl NavTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section under `parent` (or at top level)
    pub fn add_section(&mut self, parent: Option<NodeId>, title: impl Into<String>) -> NodeId {
        self.push(parent, title.into(), NodeKind::Section)
    }

    /// Append a page under `parent` (or at top level)
    pub fn add_page(
        &mut self,
        parent: Option<NodeId>,
        title: impl Into<String>,
        src_path: impl AsRef<Path>,
        content: impl Into<String>,
    ) -> NodeId {
        let page = PageSource {
            src_path: src_path.as_ref().to_path_buf(),
            content: content.into(),
        };
        self.push(parent, title.into(), NodeKind::Page(page))
    }

    fn push(&mut self, parent: Option<NodeId>, title: String, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NavNode {
            title,
            kind,
            children: Vec::new(),
            parent,
        });
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Top-level nodes in document order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &NavNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&NavNode> {
        self.nodes.get(id.0)
    }

    pub fn title(&self, id: NodeId) -> &str {
        &self.nodes[id.0].title
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order walk of the subtree rooted at `id` (the root comes first)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }
}

/// Pre-order iterator returned by [`NavTree::descendants`]
pub struct Descendants<'a> {
    tree: &'a NavTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
