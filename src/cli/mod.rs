//! Command-line interface for expozice.
//!
//! One subcommand per maintenance task: short-name renames, replaying the
//! rename log, NBSP path fixes, the manifest comparison and chronicle
//! sorting.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{self, ResolvedConfig};
use crate::core::{manifest, nbsp_fix, rename_log, sorter};
use crate::core::{FileResolver, LogReplayer, References, Renamer, SortOutcome};
use crate::domain::items;

/// expozice - maintenance tools for the exhibition content tree
#[derive(Parser, Debug)]
#[command(name = "expozice")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project directory (where `content/` lives); defaults to the current directory
    #[arg(long, global = true, env = "EXPOZICE_PROJECT")]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rename referenced panel files to short names and update the items files
    Rename {
        /// Show what would be renamed without touching anything
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Rename log to write (defaults to the configured log)
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Replay a rename log on a tree that still has the old file names
    ApplyLog {
        /// Show what would be renamed without touching anything
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Rename log to read (defaults to the configured log)
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Compare the parsed-files manifest with the configured items
    Compare {
        /// Manifest to read (defaults to samples/parsed_files.txt)
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Sort every chronicle items.json by path
    Sort,

    /// Fix whitespace (NBSP) drift between stored paths and files on disk
    FixNbsp {
        /// JSON table of explicit {config, old, new} replacements
        #[arg(long)]
        fixes: Option<PathBuf>,

        /// Report fixes without writing the items files
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let config = config::load_config(self.project.as_deref())?;

        match self.command {
            Commands::Rename { dry_run, yes, log } => rename(&config, dry_run, yes, log),
            Commands::ApplyLog { dry_run, yes, log } => apply_log(&config, dry_run, yes, log),
            Commands::Compare { manifest } => compare(&config, manifest),
            Commands::Sort => sort_chronicles(&config),
            Commands::FixNbsp { fixes, dry_run } => fix_nbsp(&config, fixes, dry_run),
            Commands::Config => show_config(&config),
        }
    }
}

/// Ask a yes/no question on stdin; anything but `yes`/`y` is a no
fn confirm(question: &str) -> Result<bool> {
    print!("{} (yes/no): ", question);
    io::stdout().flush()?;

    read_answer(&mut io::stdin().lock())
}

/// Read one answer line; a closed input counts as no
fn read_answer(input: &mut impl BufRead) -> Result<bool> {
    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "yes" | "y"))
}

/// Generate short names, move files, update items files, write the log
fn rename(config: &ResolvedConfig, dry_run: bool, yes: bool, log: Option<PathBuf>) -> Result<()> {
    let log_path = log.unwrap_or_else(|| config.rename_log.clone());

    println!("=== Collecting file references ===");
    let mut references = References::collect(&config.rename_configs_dir(), &config.rename.path_prefix)?;
    println!(
        "Found {} unique files in {} items files",
        references.len(),
        references.document_count()
    );

    println!("\n=== Generating rename mapping ===");
    let renamer = Renamer::new(&config.content, config.rename.short_namer()).with_dry_run(dry_run);
    let plan = renamer.plan(references.paths());
    println!("Generated {} rename mappings", plan.len());

    if plan.is_empty() {
        println!("Nothing to rename.");
        return Ok(());
    }

    if dry_run {
        println!("\n*** DRY RUN MODE - No files will be modified ***");
    } else if !yes && !confirm("Proceed with renaming?")? {
        println!("Aborted.");
        return Ok(());
    }

    println!("\n=== Renaming files ===");
    let report = renamer.apply(&plan, &mut references);

    let logged = if dry_run {
        0
    } else {
        rename_log::record_renames(&log_path, &report.renamed)?
    };

    println!("\n=== Summary ===");
    println!("Total files in configs: {}", report.planned);
    if dry_run {
        println!("Would rename: {}", report.renamed.len());
    } else {
        println!("Files renamed: {}", report.renamed.len());
    }
    println!("Already short: {}", report.unchanged.len());
    println!("Files not found: {}", report.not_found.len());
    println!("Destination exists: {}", report.collisions.len());
    println!("Errors: {}", report.error_count());
    if !dry_run {
        println!("Configs updated: {}", report.updated_configs.len());
        println!("Log file: {} ({} entries)", log_path.display(), logged);
    }
    for (path, e) in references.failures() {
        println!("Unreadable items file {}: {}", path.display(), e);
    }

    Ok(())
}

/// Replay the rename log
fn apply_log(config: &ResolvedConfig, dry_run: bool, yes: bool, log: Option<PathBuf>) -> Result<()> {
    let log_path = log.unwrap_or_else(|| config.rename_log.clone());

    println!("=== Rename log replay ===");
    println!("Reading log file: {}", log_path.display());

    let parsed = match rename_log::read_log(&log_path) {
        Ok(parsed) => parsed,
        Err(rename_log::RenameLogError::NotFound(path)) => {
            println!("Error: Log file '{}' not found!", path.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for w in &parsed.warnings {
        println!("Warning: Could not parse line {}: {}", w.line_number, w.line);
    }

    if parsed.entries.is_empty() {
        println!("No renames found in log file.");
        return Ok(());
    }
    println!("Found {} rename operations in log file", parsed.entries.len());

    if dry_run {
        println!("\n*** DRY RUN MODE - No files will be modified ***");
    } else if !yes && !confirm("Proceed with renaming?")? {
        println!("Aborted.");
        return Ok(());
    }

    let report = LogReplayer::new(&config.content)
        .with_dry_run(dry_run)
        .replay(&parsed.entries);

    println!("\n=== Summary ===");
    println!("Total operations: {}", report.total);
    println!("Successfully renamed: {}", report.renamed.len());
    println!("Already applied: {}", report.already_applied.len());
    println!("Not found: {}", report.not_found.len());
    println!("Errors: {}", report.errors.len());

    if dry_run {
        println!("\nThis was a DRY RUN. Run without --dry-run to actually rename files.");
    }

    Ok(())
}

/// Diff the manifest against the items files
fn compare(config: &ResolvedConfig, manifest_path: Option<PathBuf>) -> Result<()> {
    let manifest_path = manifest_path.unwrap_or_else(|| config.manifest.clone());

    // Read the manifest first: without it there is nothing to write
    println!("Reading {}...", manifest_path.display());
    let parsed = match manifest::read_manifest(&manifest_path) {
        Ok(parsed) => parsed,
        Err(manifest::ManifestError::NotFound(path)) => {
            println!("Error: Manifest '{}' not found!", path.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!("Found {} parsed files", parsed.len());

    println!("Collecting configured items from items.json files...");
    let configured = manifest::collect_configured_paths(&config.configs_dir(), &config.strip_prefix)?;
    println!(
        "Found {} configured items in {} items files",
        configured.paths.len(),
        configured.files_read
    );

    let diff = manifest::diff(&parsed, &configured.paths);

    manifest::write_path_list(&config.missing_output, &diff.missing)?;
    println!("Written missing files to {}", config.missing_output.display());
    manifest::write_path_list(&config.not_existing_output, &diff.not_existing)?;
    println!(
        "Written not existing files to {}",
        config.not_existing_output.display()
    );

    println!("\nSummary:");
    println!("- Total configured items: {}", configured.paths.len());
    println!("- Total parsed files: {}", parsed.len());
    println!("- Missing from configs: {}", diff.missing.len());
    println!("- In configs but not in parsed files: {}", diff.not_existing.len());
    println!("- Unreadable items files: {}", configured.failures.len());

    Ok(())
}

/// Sort chronicle items files
fn sort_chronicles(config: &ResolvedConfig) -> Result<()> {
    let files = items::discover(&config.chronicles_dir(), "*/items.json")?;
    println!("Found {} chronicle items.json files to sort:\n", files.len());

    let (mut sorted, mut skipped, mut errors) = (0, 0, 0);
    for path in &files {
        println!("Processing: {}", path.display());
        match sorter::sort_items_file(path) {
            Ok(SortOutcome::Sorted(count)) => {
                println!("  Sorted {} items", count);
                sorted += 1;
            }
            Ok(SortOutcome::NoItems) => {
                println!("  No items array found");
                skipped += 1;
            }
            Err(e) => {
                println!("  Error: {}", e);
                errors += 1;
            }
        }
    }

    println!("\n=== Summary ===");
    println!("Sorted: {}", sorted);
    println!("Skipped (no items): {}", skipped);
    println!("Errors: {}", errors);

    Ok(())
}

/// Fix NBSP drift, from an explicit table or by syncing with the disk
fn fix_nbsp(config: &ResolvedConfig, fixes: Option<PathBuf>, dry_run: bool) -> Result<()> {
    if dry_run {
        println!("*** DRY RUN MODE - No items files will be modified ***\n");
    }

    let report = match fixes {
        Some(table) => {
            println!("Applying fixes from {}...\n", table.display());
            let fixes = nbsp_fix::load_fixes(&table)?;
            nbsp_fix::apply_fix_table(&fixes, &config.project_root, dry_run)
        }
        None => {
            println!("Syncing stored paths with files on disk...\n");
            let resolver = FileResolver::new(&config.content);
            nbsp_fix::sync_with_disk(&config.configs_dir(), &resolver, dry_run)?
        }
    };

    for fixed in &report.fixed {
        println!("Fixed: {}", fixed.config.display());
        println!("  Old: {}", fixed.old);
        println!("  New: {}", fixed.new);
    }
    for (config_path, path) in &report.unresolved {
        println!("Not found ({}): {}", config_path.display(), path);
    }

    println!("\n=== Summary ===");
    println!("Fixed: {}", report.fixed.len());
    println!("Already correct: {}", report.unchanged);
    println!("Unresolved: {}", report.unresolved.len());
    println!("Errors: {}", report.errors.len());

    Ok(())
}

/// Show resolved configuration
fn show_config(config: &ResolvedConfig) -> Result<()> {
    let show = |label: &str, path: &Path| println!("{:<22} {}", label, path.display());

    match &config.config_file {
        Some(path) => show("Config file:", path),
        None => println!("{:<22} (none, using defaults)", "Config file:"),
    }
    show("Project root:", &config.project_root);
    show("Content:", &config.content);
    show("Rename configs:", &config.rename_configs_dir());
    show("Chronicles:", &config.chronicles_dir());
    show("Rename log:", &config.rename_log);
    show("Manifest:", &config.manifest);
    show("Missing output:", &config.missing_output);
    show("Not existing output:", &config.not_existing_output);

    println!("\nRename:");
    println!("  path prefix:  {}", config.rename.path_prefix);
    println!("  media root:   {}", config.rename.media_root);
    println!("  max words:    {}", config.rename.max_words);
    println!("  placeholder:  {}", config.rename.placeholder);
    println!("  stopwords:    {}", config.rename.stopwords.len());
    println!("\nCompare strip prefix: {}", config.strip_prefix);

    Ok(())
}
