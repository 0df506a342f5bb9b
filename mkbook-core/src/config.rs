//! Configuration parsing and management.

use crate::slug::kebab_case;
use chrono::Datelike;
use mkbook_types::NavTree;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the mkbook.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,

    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,

    #[serde(default)]
    pub nav: Vec<NavEntry>,

    #[serde(default)]
    pub books: BooksConfig,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("docs")
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// One navigation entry, mkdocs style
///
/// `- intro.md`, `- Intro: intro.md` or `- Part: [ ...entries ]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NavEntry {
    Page(String),
    Titled(BTreeMap<String, NavTarget>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NavTarget {
    Page(String),
    Section(Vec<NavEntry>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BooksConfig {
    /// Enable LaTeX generation
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Where to generate books (absolute or relative to the project dir)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Books to generate; a single default book is derived when empty
    #[serde(default)]
    pub books: Vec<BookConfig>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("books")
}

impl Default for BooksConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: default_output_dir(),
            books: Vec::new(),
        }
    }
}

/// A book as written in the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookConfig {
    /// Section title to start the book from
    #[serde(default)]
    pub root: String,

    /// Base level of the root (-2 part, -1 chapter, 0 section...)
    #[serde(default = "default_base_level")]
    pub base_level: i32,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub subtitle: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub year: Option<i32>,

    /// Email displayed on the cover
    #[serde(default)]
    pub email: Option<String>,

    /// Subdirectory of `output_dir` (kebab-case title when absent)
    #[serde(default)]
    pub directory: Option<PathBuf>,

    #[serde(default)]
    pub cover: CoverConfig,

    /// Section titles sent to the front matter
    #[serde(default)]
    pub frontmatter: Vec<String>,

    /// Section titles sent to the back matter (not classified yet)
    #[serde(default)]
    pub backmatter: Vec<String>,

    /// Source pattern (relative to the project dir) -> destination in the book dir
    #[serde(default)]
    pub copy_files: BTreeMap<String, PathBuf>,

    #[serde(default)]
    pub index_is_foreword: bool,

    #[serde(default)]
    pub drop_title_index: bool,

    #[serde(default)]
    pub debug: DebugConfig,
}

fn default_base_level() -> i32 {
    -2
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverConfig {
    /// Cover template name
    #[serde(default = "default_cover_name")]
    pub name: String,

    /// Primary color
    #[serde(default = "default_cover_color")]
    pub color: String,

    #[serde(default)]
    pub logo: Option<String>,
}

fn default_cover_name() -> String {
    String::from("circles")
}

fn default_cover_color() -> String {
    String::from("black")
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            name: default_cover_name(),
            color: default_cover_color(),
            logo: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Save the source of every page next to its rendered file
    #[serde(default)]
    pub save_source: bool,

    /// Remove generated assets that are no longer referenced
    #[serde(default = "default_true")]
    pub clean_assets: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            save_source: false,
            clean_assets: true,
        }
    }
}

/// A book with every default applied and paths resolved
#[derive(Debug, Clone)]
pub struct BookDefinition {
    pub root: String,
    pub base_level: i32,
    pub title: String,
    pub subtitle: Option<String>,
    pub author: Option<String>,
    pub year: i32,
    pub email: Option<String>,
    /// Output directory of the book
    pub directory: PathBuf,
    /// Directory `copy_files` patterns are resolved against
    pub project_dir: PathBuf,
    pub cover: CoverConfig,
    pub frontmatter: Vec<String>,
    pub backmatter: Vec<String>,
    pub copy_files: BTreeMap<String, PathBuf>,
    pub index_is_foreword: bool,
    pub drop_title_index: bool,
    pub debug: DebugConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Parse configuration from YAML text (paths stay relative to the cwd)
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Directory holding the config file
    pub fn project_dir(&self) -> PathBuf {
        self.config_path
            .as_ref()
            .and_then(|p| p.parent())
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Get the docs directory, resolved relative to config file
    pub fn docs_dir(&self) -> PathBuf {
        self.resolve_path(&self.docs_dir)
    }

    /// Get the books output directory, resolved relative to config file
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.books.output_dir)
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir().join(path)
        }
    }

    /// Apply defaults to every configured book
    ///
    /// Without any configured book, a single book rooted at the first
    /// top-level node of `tree` is produced.
    pub fn book_definitions(&self, tree: &NavTree) -> Vec<BookDefinition> {
        if self.books.books.is_empty() {
            let root = tree
                .roots()
                .first()
                .map(|id| tree.title(*id).to_string())
                .unwrap_or_default();
            tracing::debug!("No book configured; using default book rooted at '{}'", root);
            let book = BookConfig {
                root,
                base_level: default_base_level(),
                ..BookConfig::default()
            };
            return vec![self.resolve_book(&book)];
        }

        self.books
            .books
            .iter()
            .map(|book| self.resolve_book(book))
            .collect()
    }

    fn resolve_book(&self, book: &BookConfig) -> BookDefinition {
        let title = book.title.clone().unwrap_or_else(|| self.site.name.clone());
        let directory = book
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from(kebab_case(&title)));

        BookDefinition {
            root: book.root.clone(),
            base_level: book.base_level,
            subtitle: book
                .subtitle
                .clone()
                .or_else(|| self.site.description.clone()),
            author: book.author.clone().or_else(|| self.site.author.clone()),
            year: book.year.unwrap_or_else(|| chrono::Local::now().year()),
            email: book.email.clone(),
            directory: self.output_dir().join(directory),
            project_dir: self.project_dir(),
            cover: book.cover.clone(),
            frontmatter: book.frontmatter.clone(),
            backmatter: book.backmatter.clone(),
            copy_files: book.copy_files.clone(),
            index_is_foreword: book.index_is_foreword,
            drop_title_index: book.drop_title_index,
            debug: book.debug.clone(),
            title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
site:
  name: "My Docs"
  author: "Jane Doe"
  description: "Everything about things"
nav:
  - index.md
  - Guide:
      - Preface:
          - intro.md
      - Chapter 1: ch1.md
books:
  output_dir: out
  books:
    - root: Guide
      frontmatter: [Preface]
      cover:
        name: plain
"#;

    #[test]
    fn test_default_values() {
        let config = Config::parse("site:\n  name: Test\n").unwrap();

        assert_eq!(config.docs_dir, PathBuf::from("docs"));
        assert!(config.books.enabled);
        assert_eq!(config.books.output_dir, PathBuf::from("books"));
        assert!(config.nav.is_empty());
        assert!(config.books.books.is_empty());
    }

    #[test]
    fn test_parse_nav_and_books() {
        let config = Config::parse(SAMPLE).unwrap();

        assert_eq!(config.nav.len(), 2);
        assert!(matches!(&config.nav[0], NavEntry::Page(p) if p == "index.md"));
        match &config.nav[1] {
            NavEntry::Titled(map) => {
                assert!(matches!(map.get("Guide"), Some(NavTarget::Section(entries)) if entries.len() == 2));
            }
            other => panic!("unexpected entry: {:?}", other),
        }

        let book = &config.books.books[0];
        assert_eq!(book.root, "Guide");
        assert_eq!(book.base_level, -2);
        assert_eq!(book.frontmatter, vec!["Preface".to_string()]);
        assert_eq!(book.cover.name, "plain");
        assert_eq!(book.cover.color, "black");
        assert!(book.debug.clean_assets);
        assert!(!book.debug.save_source);
    }

    #[test]
    fn test_book_defaults_from_site() {
        let config = Config::parse(SAMPLE).unwrap();
        let tree = NavTree::new();
        let books = config.book_definitions(&tree);

        assert_eq!(books.len(), 1);
        let book = &books[0];
        assert_eq!(book.title, "My Docs");
        assert_eq!(book.author.as_deref(), Some("Jane Doe"));
        assert_eq!(book.subtitle.as_deref(), Some("Everything about things"));
        assert_eq!(book.directory, PathBuf::from("out").join("my-docs"));
        assert!(book.year >= 2024);
    }

    #[test]
    fn test_default_book_uses_first_top_level_node() {
        let config = Config::parse("site:\n  name: Handbook\n").unwrap();
        let mut tree = NavTree::new();
        tree.add_section(None, "Start");
        tree.add_section(None, "Other");

        let books = config.book_definitions(&tree);
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].root, "Start");
        assert_eq!(books[0].base_level, -2);
        assert_eq!(books[0].title, "Handbook");
    }

    #[test]
    fn test_paths_resolve_relative_to_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mkbook.yml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.docs_dir(), dir.path().join("docs"));
        assert_eq!(config.output_dir(), dir.path().join("out"));
        assert_eq!(config.project_dir(), dir.path());
    }
}
