//! Runs every configured book against one navigation tree.

use crate::backend::Backend;
use crate::book::{Book, BookSummary};
use crate::config::BookDefinition;
use crate::error::BookError;
use mkbook_types::NavTree;
use std::path::PathBuf;

/// Builds each book in configured order
pub struct BookDriver<'a> {
    backend: &'a dyn Backend,
    docs_dir: PathBuf,
}

impl<'a> BookDriver<'a> {
    pub fn new(backend: &'a dyn Backend, docs_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            docs_dir: docs_dir.into(),
        }
    }

    /// Resolve every book, then assemble them one after the other
    ///
    /// Nothing is built when `enabled` is false. The first error aborts the
    /// run: a missing root or an unknown cover fails before any book is
    /// written, and a failing book leaves later books unattempted.
    pub fn run(
        &self,
        tree: &NavTree,
        definitions: Vec<BookDefinition>,
        enabled: bool,
    ) -> Result<Vec<BookSummary>, BookError> {
        if !enabled {
            tracing::info!("Book generation disabled; skipping {} books", definitions.len());
            return Ok(Vec::new());
        }

        let books = definitions
            .into_iter()
            .map(|definition| Book::resolve(tree, definition))
            .collect::<Result<Vec<_>, _>>()?;

        let formatter = self.backend.formatter();
        for book in &books {
            let cover = &book.definition.cover.name;
            if formatter.cover(cover).is_none() {
                return Err(BookError::UnknownCover {
                    book: book.title().to_string(),
                    name: cover.clone(),
                });
            }
        }

        let mut summaries = Vec::with_capacity(books.len());
        for book in &books {
            let mut renderer = self.backend.renderer(&book.definition, &self.docs_dir);
            summaries.push(book.assemble(tree, renderer.as_mut(), formatter)?);
        }
        Ok(summaries)
    }
}
