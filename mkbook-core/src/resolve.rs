//! Locate the root section of a book in the navigation tree.

use mkbook_types::{NavTree, NodeId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Root section '{0}' not found in navigation")]
pub struct RootNotFound(pub String);

/// Find the first node titled `title`
///
/// Top-level nodes are searched in order, each depth-first and pre-order:
/// a node matches before any of its children, and children are searched
/// before later siblings. Titles compare exactly.
pub fn find_root(tree: &NavTree, title: &str) -> Result<NodeId, RootNotFound> {
    tree.roots()
        .iter()
        .find_map(|&top| find_in(tree, top, title))
        .ok_or_else(|| RootNotFound(title.to_string()))
}

fn find_in(tree: &NavTree, id: NodeId, title: &str) -> Option<NodeId> {
    if tree.title(id) == title {
        return Some(id);
    }
    tree.children(id)
        .iter()
        .find_map(|&child| find_in(tree, child, title))
}
