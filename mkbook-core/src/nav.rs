//! Navigation tree loading, from the `nav` setting or the docs directory.

use crate::config::{Config, NavEntry, NavTarget};
use mkbook_types::{NavTree, NodeId};
use regex::Regex;
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum NavError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Page {0:?} listed in nav does not exist")]
    MissingPage(PathBuf),

    #[error("Invalid nav entry: {0}")]
    InvalidEntry(String),

    #[error("Invalid front matter in {path:?}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to walk docs directory: {0}")]
    Walk(#[from] walkdir::Error),
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| Regex::new(r"(?s)^---\s*\n(.*?)\n---\s*\n").unwrap())
}

#[derive(Deserialize, Default)]
struct TitleOnly {
    #[serde(default)]
    title: Option<String>,
}

/// Build the navigation tree for `config`
pub fn load_nav(config: &Config) -> Result<NavTree, NavError> {
    let docs_dir = config.docs_dir();
    let mut loader = NavLoader {
        docs_dir: &docs_dir,
        tree: NavTree::new(),
    };
    if config.nav.is_empty() {
        loader.walk_docs()?;
    } else {
        loader.add_entries(None, &config.nav)?;
    }
    tracing::debug!("Loaded navigation with {} nodes", loader.tree.len());
    Ok(loader.tree)
}

struct NavLoader<'a> {
    docs_dir: &'a Path,
    tree: NavTree,
}

impl NavLoader<'_> {
    fn add_entries(&mut self, parent: Option<NodeId>, entries: &[NavEntry]) -> Result<(), NavError> {
        for entry in entries {
            match entry {
                NavEntry::Page(path) => {
                    self.add_page(parent, None, Path::new(path))?;
                }
                NavEntry::Titled(map) => {
                    if map.len() != 1 {
                        return Err(NavError::InvalidEntry(format!(
                            "expected a single `title: target` pair, found {} keys",
                            map.len()
                        )));
                    }
                    for (title, target) in map {
                        match target {
                            NavTarget::Page(path) => {
                                self.add_page(parent, Some(title), Path::new(path))?;
                            }
                            NavTarget::Section(children) => {
                                let section = self.tree.add_section(parent, title.clone());
                                self.add_entries(Some(section), children)?;
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn add_page(
        &mut self,
        parent: Option<NodeId>,
        title: Option<&String>,
        rel_path: &Path,
    ) -> Result<NodeId, NavError> {
        // Rendered pages are written below the book directory
        if !rel_path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(NavError::InvalidEntry(format!(
                "page path {:?} must stay inside the docs directory",
                rel_path
            )));
        }
        let abs_path = self.docs_dir.join(rel_path);
        if !abs_path.is_file() {
            return Err(NavError::MissingPage(rel_path.to_path_buf()));
        }
        let content = fs::read_to_string(&abs_path).map_err(|source| NavError::Io {
            path: abs_path.clone(),
            source,
        })?;
        let title = match title {
            Some(title) => title.clone(),
            None => page_title(&content, rel_path)?,
        };
        Ok(self.tree.add_page(parent, title, rel_path, content))
    }

    /// Directories become sections, Markdown files become pages
    fn walk_docs(&mut self) -> Result<(), NavError> {
        let mut sections: HashMap<PathBuf, NodeId> = HashMap::new();

        let walker = WalkDir::new(self.docs_dir)
            .min_depth(1)
            .sort_by(compare_entries)
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            let entry = entry?;
            let rel = entry
                .path()
                .strip_prefix(self.docs_dir)
                .unwrap_or(entry.path())
                .to_path_buf();
            let parent = rel.parent().and_then(|p| sections.get(p)).copied();

            if entry.file_type().is_dir() {
                let title = dir_title(&entry.file_name().to_string_lossy());
                let id = self.tree.add_section(parent, title);
                sections.insert(rel, id);
            } else if entry.file_type().is_file() && is_markdown(entry.path()) {
                self.add_page(parent, None, &rel)?;
            }
        }
        Ok(())
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

/// `index.md` first, then by file name
fn compare_entries(a: &DirEntry, b: &DirEntry) -> Ordering {
    let is_index = |e: &DirEntry| e.file_name() == "index.md";
    is_index(b)
        .cmp(&is_index(a))
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn dir_title(name: &str) -> String {
    let spaced = name.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Title of a page: front matter `title`, else the first `# ` heading,
/// else the file stem
pub fn page_title(content: &str, path: &Path) -> Result<String, NavError> {
    if let Some(captures) = frontmatter_regex().captures(content) {
        let yaml = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let meta: TitleOnly = serde_yaml::from_str(yaml).map_err(|source| NavError::Frontmatter {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(title) = meta.title.filter(|t| !t.is_empty()) {
            return Ok(title);
        }
    }

    let heading = content
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if let Some(title) = heading {
        return Ok(title);
    }

    Ok(path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default())
}
