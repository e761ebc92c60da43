//! Fixing stored paths whose whitespace drifted from the file on disk.
//!
//! Two ways in:
//! - an explicit table of `{config, old, new}` replacements, for paths that
//!   need a non-breaking space the file system lookup cannot infer
//! - a sync pass that rewrites every resolvable path to the spelling the
//!   file actually has on disk

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::resolver::{FileResolver, Resolution};
use crate::domain::items::{self, item_path, ItemsFile};

/// One explicit replacement
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathFix {
    /// Items file to edit, relative to the project root
    pub config: PathBuf,

    /// Stored path to replace
    pub old: String,

    /// Replacement path
    pub new: String,
}

/// Load a JSON array of fixes
pub fn load_fixes(path: &Path) -> Result<Vec<PathFix>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixes file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse fixes file: {}", path.display()))
}

/// A path rewritten in an items file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPath {
    pub config: PathBuf,
    pub old: String,
    pub new: String,
}

#[derive(Debug, Default)]
pub struct FixReport {
    pub fixed: Vec<FixedPath>,

    /// Paths that already match the disk
    pub unchanged: usize,

    /// Fix-table paths absent from their items file, or item paths that
    /// resolve to no file
    pub unresolved: Vec<(PathBuf, String)>,

    pub errors: Vec<(PathBuf, String)>,
}

/// Apply an explicit fix table. Config paths are relative to `base_dir`.
pub fn apply_fix_table(fixes: &[PathFix], base_dir: &Path, dry_run: bool) -> FixReport {
    let mut report = FixReport::default();

    for fix in fixes {
        let config = base_dir.join(&fix.config);

        let mut document = match ItemsFile::load(&config) {
            Ok(document) => document,
            Err(e) => {
                error!("Error processing {}: {}", config.display(), e);
                report.errors.push((config, e.to_string()));
                continue;
            }
        };

        if !document.replace_first_path(&fix.old, &fix.new) {
            warn!("Not found in {}: {}", config.display(), fix.old);
            report.unresolved.push((config, fix.old.clone()));
            continue;
        }

        if !dry_run {
            if let Err(e) = document.save() {
                error!("{}", e);
                report.errors.push((config, e.to_string()));
                continue;
            }
        }

        info!("Fixed: {}\n  Old: {}\n  New: {}", config.display(), fix.old, fix.new);
        report.fixed.push(FixedPath {
            config,
            old: fix.old.clone(),
            new: fix.new.clone(),
        });
    }

    report
}

/// Rewrite every item path that only resolves fuzzily to the spelling
/// found on disk
pub fn sync_with_disk(configs_root: &Path, resolver: &FileResolver, dry_run: bool) -> Result<FixReport> {
    let mut report = FixReport::default();

    for config in items::discover(configs_root, "**/items.json")? {
        let mut document = match ItemsFile::load(&config) {
            Ok(document) => document,
            Err(e) => {
                error!("{}", e);
                report.errors.push((config, e.to_string()));
                continue;
            }
        };

        let mut fixed_here = Vec::new();
        if let Some(items) = document.items_mut() {
            for item in items.iter_mut() {
                let Some(stored) = item_path(item).filter(|p| !p.is_empty()) else {
                    continue;
                };

                let on_disk = match resolver.resolve(stored) {
                    Resolution::Exact(_) => {
                        report.unchanged += 1;
                        continue;
                    }
                    Resolution::NotFound => {
                        report.unresolved.push((config.clone(), stored.to_string()));
                        continue;
                    }
                    Resolution::Normalized(found) | Resolution::Scanned(found) => {
                        resolver.relative_path(&found)
                    }
                };

                match on_disk {
                    Some(actual) if actual != stored => {
                        fixed_here.push(FixedPath {
                            config: config.clone(),
                            old: stored.to_string(),
                            new: actual.clone(),
                        });
                        if let Some(object) = item.as_object_mut() {
                            object.insert("path".to_string(), actual.into());
                        }
                    }
                    _ => report.unchanged += 1,
                }
            }
        }

        if fixed_here.is_empty() {
            continue;
        }

        if !dry_run {
            if let Err(e) = document.save() {
                error!("{}", e);
                report.errors.push((config, e.to_string()));
                continue;
            }
        }

        for fixed in &fixed_here {
            info!("Fixed: {} -> {}", fixed.old, fixed.new);
        }
        report.fixed.extend(fixed_here);
    }

    Ok(report)
}
