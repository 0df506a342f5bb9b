//! A resolved book and its assembly into an output directory.

use crate::assets::{self, ASSETS_DIR, ASSET_MAP_FILE};
use crate::backend::{BookMeta, Formatter, PageRenderer, PageRequest};
use crate::config::BookDefinition;
use crate::error::BookError;
use crate::matter::{linearize, Matter};
use crate::propagate::{propagate, Decorations, NodeMeta, PropagateOptions};
use crate::resolve::find_root;
use mkbook_types::{NavTree, NodeId};
use std::fs;
use std::path::{Path, PathBuf};

pub const INDEX_FILE: &str = "index.tex";
pub const ACRONYMS_FILE: &str = "acronyms.tex";
pub const GLOSSARY_FILE: &str = "glossary.tex";
pub const SOLUTIONS_FILE: &str = "solutions.tex";
pub const COVER_FILE: &str = "cover.tex";

/// One book resolved against the navigation tree
///
/// Owns its decorations, so books sharing sections never observe each
/// other's metadata.
#[derive(Debug, Clone)]
pub struct Book {
    pub definition: BookDefinition,
    pub root: NodeId,
    pub decorations: Decorations,
    pub matter: Matter,
}

/// What one assembled book produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSummary {
    pub title: String,
    pub directory: PathBuf,
    pub pages: usize,
    pub removed_assets: usize,
}

impl Book {
    /// Resolve the root, propagate metadata and classify the matter
    pub fn resolve(tree: &NavTree, definition: BookDefinition) -> Result<Self, BookError> {
        let root = find_root(tree, &definition.root).map_err(|err| BookError::RootNotFound {
            book: definition.title.clone(),
            root: err.0,
        })?;

        if !definition.backmatter.is_empty() {
            tracing::warn!(
                "Book '{}': backmatter sections are not classified yet; {:?} stay in the main matter",
                definition.title,
                definition.backmatter
            );
        }

        let decorations = propagate(tree, root, &PropagateOptions::from_definition(&definition));
        let matter = linearize(tree, root, &decorations);
        tracing::debug!(
            "Book '{}': {} front matter and {} main matter nodes",
            definition.title,
            matter.frontmatter.len(),
            matter.mainmatter.len()
        );

        Ok(Self {
            definition,
            root,
            decorations,
            matter,
        })
    }

    pub fn title(&self) -> &str {
        &self.definition.title
    }

    pub fn meta(&self, id: NodeId) -> Option<&NodeMeta> {
        self.decorations.get(id)
    }

    /// Pages of the subtree in document order
    pub fn pages<'t>(&self, tree: &'t NavTree) -> impl Iterator<Item = NodeId> + 't {
        tree.descendants(self.root)
            .filter(move |id| tree.node(*id).is_page())
    }

    /// Include and heading directives for a matter sequence
    ///
    /// Sections at or above the base level only group pages and emit nothing.
    pub fn matter_text(&self, tree: &NavTree, ids: &[NodeId], formatter: &dyn Formatter) -> String {
        let base_level = self.definition.base_level;
        let mut lines = Vec::new();
        for &id in ids {
            let node = tree.node(id);
            let Some(meta) = self.meta(id) else {
                continue;
            };
            if node.is_page() {
                if let Some(path) = &meta.output_path {
                    lines.push(formatter.include(path, &node.title));
                }
            } else if meta.level > base_level {
                lines.push(formatter.heading(&node.title, meta.level, true));
            }
        }
        lines.join("\n")
    }

    /// Render every page and write the book into its directory
    pub fn assemble(
        &self,
        tree: &NavTree,
        renderer: &mut dyn PageRenderer,
        formatter: &dyn Formatter,
    ) -> Result<BookSummary, BookError> {
        let book = self.title();
        let out_dir = &self.definition.directory;
        tracing::info!("Building book '{}' into {:?}", book, out_dir);
        fs::create_dir_all(out_dir).map_err(|e| BookError::io(book, out_dir, e))?;

        let mut pages = 0;
        for id in self.pages(tree) {
            self.build_page(tree, id, renderer)?;
            pages += 1;
        }

        // Every page is rendered: the asset map is complete now
        let asset_map = renderer.asset_map();
        let removed_assets = if self.definition.debug.clean_assets {
            let assets_dir = out_dir.join(ASSETS_DIR);
            assets::prune_assets(&assets_dir, &asset_map)
                .map_err(|e| BookError::io(book, &assets_dir, e))?
                .len()
        } else {
            0
        };
        let yaml = assets::asset_map_yaml(&asset_map).map_err(|source| BookError::AssetMap {
            book: book.to_string(),
            source,
        })?;
        self.write(ASSET_MAP_FILE, &yaml)?;

        let frontmatter = self.matter_text(tree, &self.matter.frontmatter, formatter);
        let mainmatter = self.matter_text(tree, &self.matter.mainmatter, formatter);
        let index = formatter
            .assemble(
                &BookMeta::from_definition(&self.definition),
                &frontmatter,
                &mainmatter,
            )
            .map_err(|source| BookError::Template {
                book: book.to_string(),
                source,
            })?;
        self.write(INDEX_FILE, &index)?;

        self.write(ACRONYMS_FILE, &renderer.acronym_list())?;
        self.write(GLOSSARY_FILE, &renderer.glossary_list())?;
        self.write(SOLUTIONS_FILE, &renderer.solution_list())?;

        let cover_name = &self.definition.cover.name;
        let cover = formatter
            .cover(cover_name)
            .ok_or_else(|| BookError::UnknownCover {
                book: book.to_string(),
                name: cover_name.clone(),
            })?
            .render(&self.definition.cover)
            .map_err(|source| BookError::Template {
                book: book.to_string(),
                source,
            })?;
        self.write(COVER_FILE, &cover)?;

        if let Some((name, contents)) = formatter.class_file() {
            self.write(name, contents)?;
        }

        assets::copy_files(
            &self.definition.copy_files,
            &self.definition.project_dir,
            out_dir,
        )
        .map_err(|e| BookError::io(book, out_dir, e))?;

        tracing::info!("Book '{}': {} pages written", book, pages);
        Ok(BookSummary {
            title: book.to_string(),
            directory: out_dir.clone(),
            pages,
            removed_assets,
        })
    }

    fn build_page(
        &self,
        tree: &NavTree,
        id: NodeId,
        renderer: &mut dyn PageRenderer,
    ) -> Result<(), BookError> {
        let book = self.title();
        let node = tree.node(id);
        let (Some(page), Some(meta)) = (node.page(), self.meta(id)) else {
            return Ok(());
        };
        let Some(output_path) = meta.output_path.as_deref() else {
            return Ok(());
        };

        tracing::info!("Processing LaTeX '{}' ...", page.src_path.display());
        let path = self.definition.directory.join(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BookError::io(book, parent, e))?;
        }

        if self.definition.debug.save_source {
            let extension = page
                .src_path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("md");
            let source_copy = path.with_extension(extension);
            fs::write(&source_copy, &page.content)
                .map_err(|e| BookError::io(book, &source_copy, e))?;
        }

        let request = PageRequest {
            title: &node.title,
            content: &page.content,
            src_path: &page.src_path,
            output_path,
            level: meta.level,
            numbered: meta.numbered,
            drop_title: meta.drop_title,
        };
        let text = renderer.render(&request).map_err(|source| BookError::Render {
            book: book.to_string(),
            page: node.title.clone(),
            path: page.src_path.clone(),
            source,
        })?;

        fs::write(&path, text).map_err(|e| BookError::io(book, &path, e))
    }

    fn write(&self, name: &str, contents: &str) -> Result<(), BookError> {
        let path = self.definition.directory.join(name);
        fs::write(&path, contents).map_err(|e| BookError::io(self.title(), &path, e))
    }
}

/// Paths of the artifacts every assembled book contains
pub fn book_artifacts(dir: &Path) -> Vec<PathBuf> {
    [
        INDEX_FILE,
        ACRONYMS_FILE,
        GLOSSARY_FILE,
        SOLUTIONS_FILE,
        COVER_FILE,
        ASSET_MAP_FILE,
    ]
    .iter()
    .map(|name| dir.join(name))
    .collect()
}
