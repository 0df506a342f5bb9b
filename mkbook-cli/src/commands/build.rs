//! Build command implementation.

use super::load_project;
use anyhow::{Context, Result};
use mkbook_core::BookDriver;
use mkbook_render::LatexBackend;
use std::path::Path;

/// Build every configured book into the output directory
pub fn build_books(config_path: &Path, no_books: bool) -> Result<()> {
    let (config, tree) = load_project(config_path)?;
    tracing::info!("Building books for: {}", config.site.name);

    let enabled = config.books.enabled && !no_books;
    let definitions = config.book_definitions(&tree);

    let backend = LatexBackend::new();
    let driver = BookDriver::new(&backend, config.docs_dir());
    let summaries = driver
        .run(&tree, definitions, enabled)
        .context("Failed to build books")?;

    if !enabled {
        println!("Book generation disabled");
        return Ok(());
    }

    for summary in &summaries {
        println!(
            "✓ {} ({} pages) -> {:?}",
            summary.title, summary.pages, summary.directory
        );
        if summary.removed_assets > 0 {
            tracing::info!(
                "Removed {} stale assets from {:?}",
                summary.removed_assets,
                summary.directory
            );
        }
    }
    Ok(())
}
