//! Split a decorated subtree into front matter and main matter.

use crate::propagate::Decorations;
use mkbook_types::{NavTree, NodeId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matter {
    pub frontmatter: Vec<NodeId>,
    pub mainmatter: Vec<NodeId>,
}

/// Pre-order linearization of the subtree rooted at `root`
///
/// Each node lands in the sequence its decoration selects, ahead of its own
/// descendants; siblings keep their source order. Undecorated nodes count as
/// main matter.
pub fn linearize(tree: &NavTree, root: NodeId, decorations: &Decorations) -> Matter {
    let mut matter = Matter::default();
    for id in tree.descendants(root) {
        let front = decorations.get(id).is_some_and(|meta| meta.frontmatter);
        if front {
            matter.frontmatter.push(id);
        } else {
            matter.mainmatter.push(id);
        }
    }
    matter
}
