//! Structural metadata propagated down a book's subtree.
//!
//! Decorations are kept in a [`Decorations`] side table owned by each book;
//! the navigation tree itself is never written to, so two books sharing a
//! section each see their own values.

use crate::config::BookDefinition;
use mkbook_types::{NavTree, NodeId};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Extension of rendered page files
pub const OUTPUT_EXTENSION: &str = "tex";

/// Directory of rendered pages inside a book, apart from the book's own files
pub const PAGES_DIR: &str = "pages";

/// Decoration of one node for one book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMeta {
    pub level: i32,
    pub numbered: bool,
    pub frontmatter: bool,
    /// Pages only: drop the page's own title when rendering
    pub drop_title: bool,
    /// Pages only: rendered file, relative to the book directory
    pub output_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decorations {
    metas: HashMap<NodeId, NodeMeta>,
}

impl Decorations {
    pub fn get(&self, id: NodeId) -> Option<&NodeMeta> {
        self.metas.get(&id)
    }

    pub fn len(&self) -> usize {
        self.metas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metas.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PropagateOptions {
    pub base_level: i32,
    pub frontmatter_titles: BTreeSet<String>,
    pub index_is_foreword: bool,
    pub drop_title_index: bool,
}

impl PropagateOptions {
    pub fn from_definition(book: &BookDefinition) -> Self {
        Self {
            base_level: book.base_level,
            frontmatter_titles: book.frontmatter.iter().cloned().collect(),
            index_is_foreword: book.index_is_foreword,
            drop_title_index: book.drop_title_index,
        }
    }
}

/// Decorate the subtree rooted at `root`
///
/// The root gets `base_level`, is numbered and belongs to the main matter.
/// Every other node sits one level below its parent and inherits its
/// numbering; front matter membership is sticky: a node is in the front
/// matter when its parent is or when its title is listed.
pub fn propagate(tree: &NavTree, root: NodeId, options: &PropagateOptions) -> Decorations {
    let mut decorations = Decorations::default();
    let root_meta = NodeMeta {
        level: options.base_level,
        numbered: true,
        frontmatter: false,
        drop_title: false,
        output_path: None,
    };
    visit(tree, root, root_meta, options, &mut decorations);
    decorations
}

fn visit(
    tree: &NavTree,
    id: NodeId,
    mut meta: NodeMeta,
    options: &PropagateOptions,
    decorations: &mut Decorations,
) {
    let node = tree.node(id);
    if let Some(page) = node.page() {
        meta.output_path = Some(output_path(&page.src_path));
        if options.index_is_foreword && page.stem() == "index" {
            meta.numbered = false;
            if options.drop_title_index {
                meta.drop_title = true;
            }
        }
    }

    for &child in &node.children {
        let child_meta = NodeMeta {
            level: meta.level + 1,
            numbered: meta.numbered,
            frontmatter: meta.frontmatter
                || options.frontmatter_titles.contains(tree.title(child)),
            drop_title: false,
            output_path: None,
        };
        visit(tree, child, child_meta, options, decorations);
    }

    decorations.metas.insert(id, meta);
}

/// `guide/ch1.md` renders to `pages/guide/ch1.tex`
pub fn output_path(src_path: &Path) -> PathBuf {
    Path::new(PAGES_DIR).join(src_path.with_extension(OUTPUT_EXTENSION))
}
