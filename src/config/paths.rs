//! Canonical project-relative locations.
//!
//! Single source of truth for the default layout; the config file and
//! `EXPOZICE_CONTENT` can override them.
//!
//! | Location | Purpose |
//! |----------|---------|
//! | `content/files/` | media referenced by the items files |
//! | `content/configs/**/items.json` | item lists |
//! | `content/configs/chronicles/*/items.json` | chronicle item lists (sorted) |
//! | `tabule_rename_log.txt` | rename log for replay on other machines |
//! | `samples/parsed_files.txt` | manifest of parsed files |

/// Content root, relative to the project root
pub const CONTENT_DIR: &str = "content";

/// Media directory, relative to the content root
pub const FILES_DIR: &str = "files";

/// Items file tree, relative to the content root
pub const CONFIGS_DIR: &str = "configs";

/// Chronicle categories, relative to the configs directory
pub const CHRONICLES_DIR: &str = "chronicles";

/// Exhibition panel categories, relative to the configs directory
pub const EXHIBITION_PANELS_DIR: &str = "exhibition-panels";

/// Rename log, relative to the project root
pub const RENAME_LOG: &str = "tabule_rename_log.txt";

/// Parsed-files manifest, relative to the project root
pub const MANIFEST: &str = "samples/parsed_files.txt";

/// Manifest entries no items file references
pub const MISSING_OUTPUT: &str = "missing.txt";

/// Items file entries absent from the manifest
pub const NOT_EXISTING_OUTPUT: &str = "not_existing.txt";

/// Config directory searched for in the project root and its parents
pub const CONFIG_DIR: &str = ".expozice";

/// Config file name inside `CONFIG_DIR`
pub const CONFIG_FILE: &str = "config.yaml";
