//! Core maintenance logic.
//!
//! This module contains:
//! - normalize: NBSP/Unicode normalization for name comparison
//! - resolver: locating the real file behind a configured path
//! - short_name: short ASCII names for long Czech file names
//! - renamer: planning and applying renames, propagating to items files
//! - rename_log: writing, reading and replaying the rename log
//! - manifest: diffing the parsed-files manifest against the items files
//! - sorter: sorting item lists by path
//! - nbsp_fix: repairing whitespace drift in stored paths

pub mod manifest;
pub mod nbsp_fix;
pub mod normalize;
pub mod rename_log;
pub mod renamer;
pub mod resolver;
pub mod short_name;
pub mod sorter;

// Re-export commonly used types
pub use manifest::{ConfiguredPaths, ManifestDiff, ManifestError};
pub use nbsp_fix::{FixReport, PathFix};
pub use normalize::normalize_for_matching;
pub use rename_log::{LogReplayer, ParsedLog, RenameLogError, ReplayReport};
pub use renamer::{MoveOutcome, References, RenameReport, Renamer};
pub use resolver::{FileResolver, Resolution};
pub use short_name::{AssignedNames, ShortNamer};
pub use sorter::SortOutcome;
