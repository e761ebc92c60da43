//! The rename log: a flat text record of applied renames.
//!
//! One `new_path <- old_path` line per rename, sorted by new path. The log
//! lets another machine with the same content tree (but old file names)
//! replay the renames without regenerating names. Replay never touches the
//! items files; those are expected to arrive already updated.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, warn};

use super::renamer::{relocate, MoveOutcome};
use super::resolver::FileResolver;
use crate::domain::rename::{RenameEntry, LOG_SEPARATOR};

/// Errors reading or writing the log file itself
#[derive(Debug, Error)]
pub enum RenameLogError {
    #[error("Log file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read log file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write log file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A log line that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogWarning {
    /// 1-based line number
    pub line_number: usize,

    /// The offending line, trimmed
    pub line: String,

    pub reason: &'static str,
}

/// Entries and warnings from parsing a log
#[derive(Debug, Default)]
pub struct ParsedLog {
    pub entries: Vec<RenameEntry>,
    pub warnings: Vec<LogWarning>,
}

/// Render entries as log text, sorted by new path
pub fn format_log(entries: &[RenameEntry]) -> String {
    let mut sorted: Vec<&RenameEntry> = entries.iter().collect();
    sorted.sort();

    sorted.iter().map(|entry| format!("{}\n", entry)).collect()
}

/// Write the log file, replacing any previous one
pub fn write_log(path: &Path, entries: &[RenameEntry]) -> Result<(), RenameLogError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| RenameLogError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, format_log(entries)).map_err(|source| RenameLogError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Fold a new batch of renames into the entries of an earlier log.
///
/// Renaming a path that an earlier entry produced extends that entry, so
/// every line keeps starting from the name the file had before the first
/// run. Chains that lead back to their starting name are dropped.
pub fn merge_entries(existing: Vec<RenameEntry>, renamed: &[RenameEntry]) -> Vec<RenameEntry> {
    let mut merged = existing;

    for entry in renamed {
        match merged.iter_mut().find(|earlier| earlier.new_path == entry.old_path) {
            Some(earlier) => earlier.new_path = entry.new_path.clone(),
            None => merged.push(entry.clone()),
        }
    }

    merged.retain(|entry| !entry.is_noop());
    merged.sort();
    merged.dedup();
    merged
}

/// Add `renamed` to the log at `path`, keeping the entries of earlier runs.
///
/// Nothing is written for an empty batch. Returns the number of entries in
/// the log afterwards.
pub fn record_renames(path: &Path, renamed: &[RenameEntry]) -> Result<usize, RenameLogError> {
    let existing = match read_log(path) {
        Ok(parsed) => parsed.entries,
        Err(RenameLogError::NotFound(_)) => Vec::new(),
        Err(e) => return Err(e),
    };

    if renamed.is_empty() {
        return Ok(existing.len());
    }

    let merged = merge_entries(existing, renamed);
    write_log(path, &merged)?;
    Ok(merged.len())
}

/// Parse log text. Blank lines are ignored; malformed lines become
/// warnings and parsing continues.
pub fn parse_log(content: &str) -> ParsedLog {
    let mut parsed = ParsedLog::default();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        // The line is trimmed, so both halves of a split are non-empty
        match line.split_once(LOG_SEPARATOR) {
            Some((new_path, old_path)) => {
                parsed
                    .entries
                    .push(RenameEntry::new(new_path.trim(), old_path.trim()));
            }
            None => parsed.warnings.push(LogWarning {
                line_number: index + 1,
                line: line.to_string(),
                reason: "missing ' <- ' separator",
            }),
        }
    }

    parsed
}

/// Read and parse a log file
pub fn read_log(path: &Path) -> Result<ParsedLog, RenameLogError> {
    if !path.exists() {
        return Err(RenameLogError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| RenameLogError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = parse_log(&content);
    for w in &parsed.warnings {
        warn!("Could not parse line {} ({}): {}", w.line_number, w.reason, w.line);
    }

    Ok(parsed)
}

/// Outcome of replaying a log
#[derive(Debug, Default)]
pub struct ReplayReport {
    pub total: usize,

    /// Applied (or, in a dry run, applicable) renames
    pub renamed: Vec<RenameEntry>,

    /// New path already present: rename applied earlier
    pub already_applied: Vec<RenameEntry>,

    /// Old path could not be resolved
    pub not_found: Vec<RenameEntry>,

    pub errors: Vec<(RenameEntry, String)>,
}

impl ReplayReport {
    pub fn skipped(&self) -> usize {
        self.already_applied.len() + self.not_found.len()
    }
}

/// Applies logged renames to a content tree
#[derive(Debug, Clone)]
pub struct LogReplayer {
    resolver: FileResolver,
    dry_run: bool,
}

impl LogReplayer {
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            resolver: FileResolver::new(content_root),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Replay every entry. Running it twice is harmless: the second run
    /// reports everything as already applied.
    pub fn replay(&self, entries: &[RenameEntry]) -> ReplayReport {
        let mut report = ReplayReport {
            total: entries.len(),
            ..Default::default()
        };

        for entry in entries {
            if fs::symlink_metadata(self.resolver.target(&entry.new_path)).is_ok() {
                info!("Already exists: {}", entry.new_path);
                report.already_applied.push(entry.clone());
                continue;
            }

            match relocate(&self.resolver, entry, self.dry_run) {
                MoveOutcome::Renamed => {
                    info!("Renamed: {} -> {}", entry.old_path, entry.new_path);
                    report.renamed.push(entry.clone());
                }
                MoveOutcome::WouldRename => {
                    info!("[dry run] Would rename: {} -> {}", entry.old_path, entry.new_path);
                    report.renamed.push(entry.clone());
                }
                MoveOutcome::NotFound => {
                    warn!("File not found: {}", entry.old_path);
                    report.not_found.push(entry.clone());
                }
                // Destination appeared between the check and the move, or
                // the entry maps a path onto itself
                MoveOutcome::Collision | MoveOutcome::Unchanged => {
                    report.already_applied.push(entry.clone());
                }
                MoveOutcome::Failed(e) => {
                    error!("Error renaming {}: {}", entry.old_path, e);
                    report.errors.push((entry.clone(), e));
                }
            }
        }

        report
    }
}
