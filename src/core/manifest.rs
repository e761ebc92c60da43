//! Comparing the parsed-files manifest with the configured items.
//!
//! - missing: in the manifest, referenced by no items file
//! - not existing: referenced by an items file, absent from the manifest

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::error;

use crate::domain::items::{self, ItemsFile};

/// Prefix the items files carry and the manifest does not
pub const DEFAULT_STRIP_PREFIX: &str = "files/";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Manifest not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Paths referenced by the items files
#[derive(Debug, Default)]
pub struct ConfiguredPaths {
    pub paths: BTreeSet<String>,

    /// Number of items files read
    pub files_read: usize,

    /// Items files that could not be read
    pub failures: Vec<(PathBuf, String)>,
}

/// Collect every item path under `configs_root` with `strip_prefix`
/// removed. Empty paths are ignored; unreadable files are reported and
/// skipped.
pub fn collect_configured_paths(configs_root: &Path, strip_prefix: &str) -> Result<ConfiguredPaths> {
    let mut configured = ConfiguredPaths::default();

    for path in items::discover(configs_root, "**/items.json")? {
        match ItemsFile::load(&path) {
            Ok(document) => {
                configured.files_read += 1;
                configured.paths.extend(
                    document
                        .item_paths()
                        .map(|p| p.strip_prefix(strip_prefix).unwrap_or(p))
                        .filter(|p| !p.is_empty())
                        .map(str::to_string),
                );
            }
            Err(e) => {
                error!("{}", e);
                configured.failures.push((path, e.to_string()));
            }
        }
    }

    Ok(configured)
}

/// Parse manifest text: one path per line, trimmed, blanks skipped
pub fn parse_manifest(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read the manifest file
pub fn read_manifest(path: &Path) -> Result<BTreeSet<String>, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_manifest(&content))
}

/// Both directions of the set difference
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ManifestDiff {
    /// parsed - configured
    pub missing: BTreeSet<String>,

    /// configured - parsed
    pub not_existing: BTreeSet<String>,
}

pub fn diff(parsed: &BTreeSet<String>, configured: &BTreeSet<String>) -> ManifestDiff {
    ManifestDiff {
        missing: parsed.difference(configured).cloned().collect(),
        not_existing: configured.difference(parsed).cloned().collect(),
    }
}

/// Write a sorted path list, one newline-terminated path per line
pub fn write_path_list(path: &Path, paths: &BTreeSet<String>) -> Result<()> {
    let content: String = paths.iter().map(|p| format!("{}\n", p)).collect();
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_manifest() {
        let parsed = parse_manifest("Tabule/b.jpg\n\n  Tabule/a.jpg  \nTabule/b.jpg\n");
        assert_eq!(parsed, set(&["Tabule/a.jpg", "Tabule/b.jpg"]));
    }

    #[test]
    fn test_diff_both_directions() {
        let parsed = set(&["a", "b", "c"]);
        let configured = set(&["b", "c", "d"]);

        let result = diff(&parsed, &configured);
        assert_eq!(result.missing, set(&["a"]));
        assert_eq!(result.not_existing, set(&["d"]));
        assert!(result.missing.is_disjoint(&result.not_existing));
    }

    #[test]
    fn test_diff_of_equal_sets_is_empty() {
        let paths = set(&["x", "y"]);
        assert_eq!(diff(&paths, &paths), ManifestDiff::default());
    }
}
