//! CLI command implementations.

pub mod build;
pub mod init;
pub mod outline;

pub use build::build_books;
pub use init::init_project;
pub use outline::outline_books;

use anyhow::{Context, Result};
use mkbook_core::{load_nav, Config, NavTree};
use std::path::Path;

/// Load the configuration and its navigation tree
pub(crate) fn load_project(config_path: &Path) -> Result<(Config, NavTree)> {
    tracing::info!("Loading config from {:?}", config_path);
    let config = Config::from_file(config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;
    let tree = load_nav(&config).context("Failed to load navigation")?;
    Ok((config, tree))
}
