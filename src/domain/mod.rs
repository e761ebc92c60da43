//! Domain types for the content tree.
//!
//! This module contains the core data structures:
//! - ItemsFile: an `items.json` document referencing media by path
//! - RenameEntry: an old -> new path pair

pub mod items;
pub mod rename;

// Re-export commonly used types
pub use items::{item_path, ItemsFile, ItemsFileError, ITEMS_FILE_NAME};
pub use rename::{RenameEntry, LOG_SEPARATOR};
