//! Renaming referenced media files to short names.
//!
//! The flow is: collect every path referenced from the items files, plan
//! an old -> new mapping with the short name generator, move the files,
//! then rewrite the items files for the renames that actually happened.
//! A skipped rename leaves every reference untouched, so the items files
//! and the file system agree even after a partial run.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{error, info, warn};

use super::resolver::FileResolver;
use super::short_name::{AssignedNames, ShortNamer};
use crate::domain::items::{self, ItemsFile};
use crate::domain::rename::{self, RenameEntry};

/// What happened to a single rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// File moved
    Renamed,

    /// Dry run: the file would have been moved
    WouldRename,

    /// The generated name equals the current one
    Unchanged,

    /// Source file could not be resolved
    NotFound,

    /// Destination already exists; never overwritten
    Collision,

    /// I/O error while moving
    Failed(String),
}

impl MoveOutcome {
    /// Counts as a rename for propagation and the log
    pub fn is_success(&self) -> bool {
        matches!(self, MoveOutcome::Renamed | MoveOutcome::WouldRename)
    }
}

/// Move the file behind `entry.old_path` to `entry.new_path`.
///
/// The source is resolved fuzzily; the destination must not exist. Parent
/// directories of the destination are created as needed.
pub fn relocate(resolver: &FileResolver, entry: &RenameEntry, dry_run: bool) -> MoveOutcome {
    let Some(source) = resolver.resolve(&entry.old_path).into_path() else {
        return MoveOutcome::NotFound;
    };

    if entry.is_noop() {
        return MoveOutcome::Unchanged;
    }

    let destination = resolver.target(&entry.new_path);
    if fs::symlink_metadata(&destination).is_ok() {
        return MoveOutcome::Collision;
    }

    if dry_run {
        return MoveOutcome::WouldRename;
    }

    match move_file(&source, &destination) {
        Ok(()) => MoveOutcome::Renamed,
        Err(e) => MoveOutcome::Failed(e.to_string()),
    }
}

// Renames stay inside one directory tree. A move across file systems fails
// with EXDEV (no copy fallback) and is reported as `Failed`.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(source, destination)
}

/// Items files and the paths they reference
#[derive(Debug, Default)]
pub struct References {
    documents: Vec<ItemsFile>,

    /// Referenced path -> indices into `documents`
    paths: BTreeMap<String, BTreeSet<usize>>,

    /// Items files that could not be loaded
    failures: Vec<(PathBuf, String)>,
}

impl References {
    /// Load every items file under `configs_root` and index the paths that
    /// start with `prefix`
    pub fn collect(configs_root: &Path, prefix: &str) -> Result<Self> {
        let mut references = Self::default();

        for path in items::discover(configs_root, "**/items.json")? {
            match ItemsFile::load(&path) {
                Ok(document) => references.add(document, prefix),
                Err(e) => {
                    error!("{}", e);
                    references.failures.push((path, e.to_string()));
                }
            }
        }

        Ok(references)
    }

    /// Index an already loaded document
    pub fn add(&mut self, document: ItemsFile, prefix: &str) {
        let index = self.documents.len();
        for path in document.item_paths().filter(|p| p.starts_with(prefix)) {
            self.paths.entry(path.to_string()).or_default().insert(index);
        }
        self.documents.push(document);
    }

    /// Distinct referenced paths, sorted
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn failures(&self) -> &[(PathBuf, String)] {
        &self.failures
    }

    /// Rewrite and save every document referencing one of the renamed old
    /// paths. Returns the saved files and the ones that failed to save.
    pub fn propagate(&mut self, renamed: &[RenameEntry]) -> (Vec<PathBuf>, Vec<(PathBuf, String)>) {
        let mapping: HashMap<&str, &str> = renamed
            .iter()
            .map(|entry| (entry.old_path.as_str(), entry.new_path.as_str()))
            .collect();

        let touched: BTreeSet<usize> = renamed
            .iter()
            .filter_map(|entry| self.paths.get(&entry.old_path))
            .flatten()
            .copied()
            .collect();

        let mut saved = Vec::new();
        let mut failed = Vec::new();

        for index in touched {
            let document = &mut self.documents[index];
            if document.rewrite_paths(&mapping) == 0 {
                continue;
            }

            match document.save() {
                Ok(()) => {
                    info!("Updated {}", document.path().display());
                    saved.push(document.path().to_path_buf());
                }
                Err(e) => {
                    error!("{}", e);
                    failed.push((document.path().to_path_buf(), e.to_string()));
                }
            }
        }

        (saved, failed)
    }
}

/// Outcome of a rename batch
#[derive(Debug, Default)]
pub struct RenameReport {
    /// Number of planned mappings
    pub planned: usize,

    /// Successful renames (or, in a dry run, renames that would happen)
    pub renamed: Vec<RenameEntry>,

    /// Files whose short name equals the current name
    pub unchanged: Vec<String>,

    /// Old paths that did not resolve to a file
    pub not_found: Vec<String>,

    /// Renames skipped because the destination exists
    pub collisions: Vec<RenameEntry>,

    /// Renames that failed with an I/O error
    pub errors: Vec<(RenameEntry, String)>,

    /// Items files rewritten
    pub updated_configs: Vec<PathBuf>,

    /// Items files that could not be rewritten
    pub config_errors: Vec<(PathBuf, String)>,
}

impl RenameReport {
    pub fn skipped(&self) -> usize {
        self.not_found.len() + self.collisions.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len() + self.config_errors.len()
    }
}

/// Plans and applies short-name renames under a content root
#[derive(Debug, Clone)]
pub struct Renamer {
    resolver: FileResolver,
    namer: ShortNamer,
    dry_run: bool,
}

impl Renamer {
    pub fn new(content_root: impl Into<PathBuf>, namer: ShortNamer) -> Self {
        Self {
            resolver: FileResolver::new(content_root),
            namer,
            dry_run: false,
        }
    }

    /// Report what would happen without touching files
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Map every distinct old path (in sorted order) to its new path. Only
    /// the file name changes; the directory part is kept.
    pub fn plan<'a>(&self, old_paths: impl IntoIterator<Item = &'a str>) -> Vec<RenameEntry> {
        let distinct: BTreeSet<&str> = old_paths.into_iter().collect();
        let mut assigned = AssignedNames::new();

        distinct
            .into_iter()
            .map(|old_path| {
                let new_name = self.namer.generate(old_path, &mut assigned);
                RenameEntry::new(rename::with_file_name(old_path, &new_name), old_path)
            })
            .collect()
    }

    /// Move the files, then update the items files for successful renames
    pub fn apply(&self, plan: &[RenameEntry], references: &mut References) -> RenameReport {
        let mut report = RenameReport {
            planned: plan.len(),
            ..Default::default()
        };

        for entry in plan {
            match relocate(&self.resolver, entry, self.dry_run) {
                MoveOutcome::Renamed => {
                    info!("Renamed: {} -> {}", entry.old_path, entry.new_path);
                    report.renamed.push(entry.clone());
                }
                MoveOutcome::WouldRename => {
                    info!("[dry run] Would rename: {} -> {}", entry.old_path, entry.new_path);
                    report.renamed.push(entry.clone());
                }
                MoveOutcome::Unchanged => {
                    report.unchanged.push(entry.old_path.clone());
                }
                MoveOutcome::NotFound => {
                    warn!("File not found, skipping: {}", entry.old_path);
                    report.not_found.push(entry.old_path.clone());
                }
                MoveOutcome::Collision => {
                    warn!("Destination exists, skipping: {} -> {}", entry.old_path, entry.new_path);
                    report.collisions.push(entry.clone());
                }
                MoveOutcome::Failed(e) => {
                    error!("Error renaming {}: {}", entry.old_path, e);
                    report.errors.push((entry.clone(), e));
                }
            }
        }

        if !self.dry_run {
            let (saved, failed) = references.propagate(&report.renamed);
            report.updated_configs = saved;
            report.config_errors = failed;
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn document(path: &str, paths: &[&str]) -> ItemsFile {
        let items: Vec<_> = paths.iter().map(|p| json!({ "path": p })).collect();
        ItemsFile::from_value(PathBuf::from(path), json!({ "items": items })).unwrap()
    }

    #[test]
    fn test_plan_is_sorted_and_keeps_directories() {
        let renamer = Renamer::new("content", ShortNamer::default());
        let plan = renamer.plan([
            "files/Tabule/2-kolonizační/Zápis o přítomnosti středověkých jam (1905–1977).jpg",
            "files/Tabule/1-PRAVĚKÁ.pdf",
            "files/Tabule/1-PRAVĚKÁ.pdf",
        ]);

        assert_eq!(
            plan,
            vec![
                RenameEntry::new("files/Tabule/1-praveka.pdf", "files/Tabule/1-PRAVĚKÁ.pdf"),
                RenameEntry::new(
                    "files/Tabule/2-kolonizační/zapis-pritomnosti-stredovekych-jam.jpg",
                    "files/Tabule/2-kolonizační/Zápis o přítomnosti středověkých jam (1905–1977).jpg"
                ),
            ]
        );
    }

    #[test]
    fn test_references_index_by_prefix() {
        let mut references = References::default();
        references.add(
            document("a/items.json", &["files/Tabule/x.jpg", "files/Other/y.jpg"]),
            "files/Tabule/",
        );
        references.add(document("b/items.json", &["files/Tabule/x.jpg"]), "files/Tabule/");

        assert_eq!(references.len(), 1);
        assert_eq!(references.document_count(), 2);
        assert_eq!(references.paths().collect::<Vec<_>>(), vec!["files/Tabule/x.jpg"]);
    }

    #[test]
    fn test_relocate_noop_and_missing() {
        let temp = TempDir::new().unwrap();
        let resolver = FileResolver::new(temp.path());

        // A missing file is not found even when its name would not change
        let noop = RenameEntry::new("files/a.jpg", "files/a.jpg");
        assert_eq!(relocate(&resolver, &noop, false), MoveOutcome::NotFound);

        let missing = RenameEntry::new("files/b.jpg", "files/a.jpg");
        assert_eq!(relocate(&resolver, &missing, false), MoveOutcome::NotFound);

        fs::create_dir_all(temp.path().join("files")).unwrap();
        fs::write(temp.path().join("files/a.jpg"), b"a").unwrap();
        assert_eq!(relocate(&resolver, &noop, false), MoveOutcome::Unchanged);
    }

    #[test]
    fn test_failed_move_is_reported_and_batch_continues() {
        let temp = TempDir::new().unwrap();
        let files = temp.path().join("files");
        fs::create_dir_all(&files).unwrap();
        fs::write(files.join("Prvni obrazek.jpg"), b"1").unwrap();
        fs::write(files.join("Druhy obrazek.jpg"), b"2").unwrap();
        // A plain file where the destination directory should be
        fs::write(files.join("blocked"), b"").unwrap();

        let plan = vec![
            RenameEntry::new("files/blocked/prvni-obrazek.jpg", "files/Prvni obrazek.jpg"),
            RenameEntry::new("files/druhy-obrazek.jpg", "files/Druhy obrazek.jpg"),
        ];
        let renamer = Renamer::new(temp.path(), ShortNamer::default());
        let report = renamer.apply(&plan, &mut References::default());

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, plan[0]);
        assert_eq!(report.renamed, vec![plan[1].clone()]);
        assert!(files.join("Prvni obrazek.jpg").is_file());
        assert!(files.join("druhy-obrazek.jpg").is_file());
    }

    #[test]
    fn test_relocate_never_overwrites() {
        let temp = TempDir::new().unwrap();
        let files = temp.path().join("files");
        fs::create_dir_all(&files).unwrap();
        fs::write(files.join("old.jpg"), b"old").unwrap();
        fs::write(files.join("new.jpg"), b"new").unwrap();

        let resolver = FileResolver::new(temp.path());
        let entry = RenameEntry::new("files/new.jpg", "files/old.jpg");

        assert_eq!(relocate(&resolver, &entry, false), MoveOutcome::Collision);
        assert_eq!(fs::read(files.join("old.jpg")).unwrap(), b"old");
        assert_eq!(fs::read(files.join("new.jpg")).unwrap(), b"new");
    }

    #[test]
    fn test_relocate_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("files")).unwrap();
        fs::write(temp.path().join("files/Dlouhý název.jpg"), b"x").unwrap();

        let resolver = FileResolver::new(temp.path());
        let entry = RenameEntry::new("files/sub/dlouhy-nazev.jpg", "files/Dlouhý název.jpg");

        assert_eq!(relocate(&resolver, &entry, true), MoveOutcome::WouldRename);
        assert!(temp.path().join("files/Dlouhý název.jpg").exists());

        assert_eq!(relocate(&resolver, &entry, false), MoveOutcome::Renamed);
        assert!(temp.path().join("files/sub/dlouhy-nazev.jpg").exists());
        assert!(!temp.path().join("files/Dlouhý název.jpg").exists());
    }
}
