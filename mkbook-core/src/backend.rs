//! Seams between book assembly and the output format.
//!
//! The core walks the navigation tree and decides what goes where; turning
//! page content into text and wrapping it into a document is left to a
//! [`Backend`].

use crate::assets::AssetMap;
use crate::config::{BookDefinition, CoverConfig};
use crate::error::RenderError;
use std::path::Path;

/// A page handed to the renderer, with its propagated metadata
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    pub title: &'a str,
    pub content: &'a str,
    /// Source path relative to the docs directory
    pub src_path: &'a Path,
    /// Output path relative to the book directory
    pub output_path: &'a Path,
    pub level: i32,
    pub numbered: bool,
    pub drop_title: bool,
}

/// Title metadata passed to the book template
#[derive(Debug, Clone, Copy)]
pub struct BookMeta<'a> {
    pub title: &'a str,
    pub subtitle: Option<&'a str>,
    pub author: Option<&'a str>,
    pub email: Option<&'a str>,
    pub year: i32,
}

impl<'a> BookMeta<'a> {
    pub fn from_definition(book: &'a BookDefinition) -> Self {
        Self {
            title: &book.title,
            subtitle: book.subtitle.as_deref(),
            author: book.author.as_deref(),
            email: book.email.as_deref(),
            year: book.year,
        }
    }
}

/// Converts pages of one book and accumulates what they define
///
/// A renderer is created per book; the lists it returns cover every page
/// rendered so far.
pub trait PageRenderer {
    fn render(&mut self, page: &PageRequest<'_>) -> Result<String, RenderError>;

    /// Generated assets (file name under `assets/`) and their sources
    fn asset_map(&self) -> AssetMap;

    fn acronym_list(&self) -> String;

    fn glossary_list(&self) -> String;

    fn solution_list(&self) -> String;
}

pub trait CoverTemplate {
    fn render(&self, cover: &CoverConfig) -> Result<String, RenderError>;
}

/// Directive and document templates of the output format
pub trait Formatter {
    /// Directive including a rendered page
    fn include(&self, path: &Path, title: &str) -> String;

    /// Directive opening a heading for a section
    fn heading(&self, title: &str, level: i32, numbered: bool) -> String;

    /// Composite document from the two matter blocks
    fn assemble(
        &self,
        meta: &BookMeta<'_>,
        frontmatter: &str,
        mainmatter: &str,
    ) -> Result<String, RenderError>;

    /// Cover template registered under `name`
    fn cover(&self, name: &str) -> Option<&dyn CoverTemplate>;

    /// Support file written next to the document, as `(file name, contents)`
    fn class_file(&self) -> Option<(&str, &str)> {
        None
    }
}

pub trait Backend {
    /// Fresh renderer for `book`, reading sources under `docs_dir`
    fn renderer(&self, book: &BookDefinition, docs_dir: &Path) -> Box<dyn PageRenderer>;

    fn formatter(&self) -> &dyn Formatter;
}
