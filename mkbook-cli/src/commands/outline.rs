//! Outline command: the matter split of every book, without writing output.

use super::load_project;
use anyhow::{Context, Result};
use mkbook_core::{Book, NavTree, NodeId};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct BookOutline {
    title: String,
    root: String,
    directory: PathBuf,
    frontmatter: Vec<OutlineEntry>,
    mainmatter: Vec<OutlineEntry>,
}

#[derive(Debug, Serialize)]
struct OutlineEntry {
    title: String,
    kind: &'static str,
    level: i32,
    numbered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<PathBuf>,
}

/// Print the front and main matter of each configured book
pub fn outline_books(config_path: &Path, json: bool) -> Result<()> {
    let (config, tree) = load_project(config_path)?;

    let outlines = config
        .book_definitions(&tree)
        .into_iter()
        .map(|definition| Book::resolve(&tree, definition).map(|book| outline(&tree, &book)))
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to resolve books")?;

    if json {
        let json = serde_json::to_string_pretty(&outlines)?;
        println!("{json}");
        return Ok(());
    }

    for book in &outlines {
        println!("{} (root: {}) -> {:?}", book.title, book.root, book.directory);
        print_matter("front matter", &book.frontmatter);
        print_matter("main matter", &book.mainmatter);
    }
    Ok(())
}

fn outline(tree: &NavTree, book: &Book) -> BookOutline {
    let entries = |ids: &[NodeId]| {
        ids.iter()
            .filter_map(|&id| {
                let meta = book.meta(id)?;
                let node = tree.node(id);
                Some(OutlineEntry {
                    title: node.title.clone(),
                    kind: if node.is_page() { "page" } else { "section" },
                    level: meta.level,
                    numbered: meta.numbered,
                    output: meta.output_path.clone(),
                })
            })
            .collect::<Vec<_>>()
    };

    BookOutline {
        title: book.definition.title.clone(),
        root: book.definition.root.clone(),
        directory: book.definition.directory.clone(),
        frontmatter: entries(&book.matter.frontmatter),
        mainmatter: entries(&book.matter.mainmatter),
    }
}

fn print_matter(label: &str, entries: &[OutlineEntry]) {
    println!("  {}:", label);
    if entries.is_empty() {
        println!("    (empty)");
    }
    for entry in entries {
        let marker = if entry.numbered { "" } else { "*" };
        match &entry.output {
            Some(output) => println!(
                "    [{}{}] {} -> {}",
                entry.level,
                marker,
                entry.title,
                output.display()
            ),
            None => println!("    [{}{}] {}", entry.level, marker, entry.title),
        }
    }
}
