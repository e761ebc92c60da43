//! expozice - maintenance tools for the exhibition content tree
//!
//! Batch operations over `content/files` (media) and
//! `content/configs/**/items.json` (item lists referencing media by path).
//!
//! # Modules
//!
//! - `core`: name normalization, fuzzy file resolution, short names,
//!   renames, the rename log, manifest diff, sorting, NBSP fixes
//! - `domain`: Data structures (ItemsFile, RenameEntry)
//! - `config`: Project layout and rename settings
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Rename panel files to short names (asks before touching anything)
//! expozice rename
//!
//! # Replay the rename log on another machine
//! expozice apply-log --dry-run
//!
//! # Write missing.txt / not_existing.txt
//! expozice compare
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use config::ResolvedConfig;
pub use core::{FileResolver, LogReplayer, Renamer, Resolution, ShortNamer};
pub use domain::{ItemsFile, RenameEntry};
