//! # mkbook-core
//!
//! Core library for the mkbook LaTeX book builder.
//!
//! This crate loads the configuration and the navigation tree, resolves each
//! configured book to a subtree, decorates and linearizes it, and drives the
//! assembly of the book through a [`Backend`].

pub mod assets;
pub mod backend;
pub mod book;
pub mod config;
pub mod driver;
pub mod error;
pub mod matter;
pub mod nav;
pub mod propagate;
pub mod resolve;
pub mod slug;

pub use assets::AssetMap;
pub use backend::{Backend, BookMeta, CoverTemplate, Formatter, PageRenderer, PageRequest};
pub use book::{Book, BookSummary};
pub use config::{BookConfig, BookDefinition, Config, CoverConfig, DebugConfig};
pub use driver::BookDriver;
pub use error::{BookError, RenderError};
pub use matter::{linearize, Matter};
pub use nav::{load_nav, NavError};
pub use propagate::{output_path, propagate, Decorations, NodeMeta, PropagateOptions, PAGES_DIR};
pub use resolve::{find_root, RootNotFound};
pub use slug::kebab_case;

pub use mkbook_types::{NavNode, NavTree, NodeId, NodeKind, PageSource};
