//! Init command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"site:
  name: My Documentation
  author: Your Name
  description: Project handbook

docs_dir: docs

nav:
  - index.md
  - Guide:
      - Preface:
          - guide/preface.md
      - Getting Started: guide/getting-started.md

books:
  enabled: true
  output_dir: books
  books:
    - root: Guide
      base_level: -2
      frontmatter: [Preface]
      cover:
        name: circles
        color: black
"#;

/// Initialize a new mkbook project
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    write_config(root)?;
    scaffold_docs(root)?;

    println!("✓ mkbook initialized in {:?}", root);
    println!("  - Edit mkbook.yml to describe your books");
    println!("  - Run `mkbook build` to generate the LaTeX sources");
    Ok(())
}

fn write_config(root: &Path) -> Result<()> {
    let config_path = root.join("mkbook.yml");
    if config_path.exists() {
        println!("mkbook.yml already exists at {:?}", config_path);
        return Ok(());
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {:?}", config_path))?;
    println!("Created {:?}", config_path);
    Ok(())
}

fn scaffold_docs(root: &Path) -> Result<()> {
    let docs = root.join("docs");
    let guide = docs.join("guide");
    fs::create_dir_all(&guide).with_context(|| format!("Failed to create {:?}", guide))?;

    let pages = [
        (docs.join("index.md"), "# Welcome\n\nThis page is not part of any book.\n"),
        (
            guide.join("preface.md"),
            "# Preface\n\nFront matter pages are not numbered.\n",
        ),
        (
            guide.join("getting-started.md"),
            "# Getting Started\n\n*[LaTeX]: A document preparation system\n\nBuild the book, then run LaTeX on `books/my-documentation/index.tex`.\n",
        ),
    ];
    for (path, content) in pages {
        if path.exists() {
            continue;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;
        println!("Created {:?}", path);
    }
    Ok(())
}
