//! Generated assets and auxiliary files of a book directory.

use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Asset file name (under the book's `assets/` directory) -> source reference
pub type AssetMap = BTreeMap<String, String>;

/// Name of the asset directory inside a book directory
pub const ASSETS_DIR: &str = "assets";

/// Name of the persisted asset map inside a book directory
pub const ASSET_MAP_FILE: &str = "assets_map.yml";

/// Remove every file directly under `assets_dir` that `map` does not list
///
/// Returns the removed paths. A missing directory has nothing to prune.
pub fn prune_assets(assets_dir: &Path, map: &AssetMap) -> io::Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    let entries = match fs::read_dir(assets_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(removed),
        Err(err) => return Err(err),
    };

    let mut stale = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !map.contains_key(&name) {
            stale.push(entry.path());
        }
    }
    stale.sort();

    for path in stale {
        tracing::info!("Removing unused asset {:?}", path);
        fs::remove_file(&path)?;
        removed.push(path);
    }
    Ok(removed)
}

/// Serialize the asset map as a flat YAML document
pub fn asset_map_yaml(map: &AssetMap) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(map)
}

/// Copy the files matched by each `pattern -> destination` rule
///
/// Patterns are relative to `project_dir` and may use `*` and `?` in their
/// last component. Destinations are directories relative to `book_dir`.
/// A literal pattern that does not exist is skipped with a warning.
pub fn copy_files(
    rules: &BTreeMap<String, PathBuf>,
    project_dir: &Path,
    book_dir: &Path,
) -> io::Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    for (pattern, destination) in rules {
        let pattern_path = project_dir.join(pattern);
        let dest_dir = book_dir.join(destination);

        let Some(name_pattern) = pattern_path.file_name().map(|n| n.to_string_lossy().to_string())
        else {
            tracing::warn!("Pattern {:?} has no file name", pattern_path);
            continue;
        };
        let parent = pattern_path.parent().unwrap_or(project_dir);

        let sources = if is_wildcard(&name_pattern) {
            matching_files(parent, &name_pattern)?
        } else if pattern_path.is_file() {
            vec![pattern_path.clone()]
        } else {
            tracing::warn!("Pattern {:?} does not exist", pattern_path);
            continue;
        };

        for src in sources {
            let Some(file_name) = src.file_name() else {
                continue;
            };
            let dest = dest_dir.join(file_name);
            tracing::info!("Copying {:?} to {:?}", src, dest);
            fs::create_dir_all(&dest_dir)?;
            fs::copy(&src, &dest)?;
            copied.push(dest);
        }
    }
    Ok(copied)
}

fn is_wildcard(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

fn matching_files(dir: &Path, pattern: &str) -> io::Result<Vec<PathBuf>> {
    let re = glob_regex(pattern).map_err(io::Error::other)?;
    let mut files = Vec::new();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("Directory {:?} does not exist", dir);
            return Ok(files);
        }
        Err(err) => return Err(err),
    };
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() && re.is_match(&entry.file_name().to_string_lossy()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn glob_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut re = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re)
}
