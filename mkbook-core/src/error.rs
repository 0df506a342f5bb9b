//! Errors raised while building books.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a page renderer or a template
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Invalid content: {0}")]
    Content(String),
}

/// Fatal errors of a book run; the first one aborts every remaining book
#[derive(Error, Debug)]
pub enum BookError {
    #[error("Book '{book}': root section '{root}' not found in navigation")]
    RootNotFound { book: String, root: String },

    #[error("Book '{book}': unknown cover template '{name}'")]
    UnknownCover { book: String, name: String },

    #[error("Book '{book}': failed to render page '{page}' ({path:?}): {source}")]
    Render {
        book: String,
        page: String,
        path: PathBuf,
        #[source]
        source: RenderError,
    },

    #[error("Book '{book}': template error: {source}")]
    Template {
        book: String,
        #[source]
        source: RenderError,
    },

    #[error("Book '{book}': IO error on {path:?}: {source}")]
    Io {
        book: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Book '{book}': failed to serialize asset map: {source}")]
    AssetMap {
        book: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl BookError {
    pub(crate) fn io(book: &str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BookError::Io {
            book: book.to_string(),
            path: path.into(),
            source,
        }
    }
}
