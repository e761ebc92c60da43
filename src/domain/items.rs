//! Items files: the `{"items": [{"path": ...}, ...]}` documents under
//! `content/configs`.
//!
//! Documents are kept as raw JSON maps so that metadata we never look at
//! (titles, descriptions, ordering of keys) survives a rewrite untouched.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use thiserror::Error;

/// File name every category directory uses for its item list
pub const ITEMS_FILE_NAME: &str = "items.json";

/// Errors from loading or saving a single items file
#[derive(Debug, Error)]
pub enum ItemsFileError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} is not a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One `items.json` document
#[derive(Debug, Clone)]
pub struct ItemsFile {
    /// Where the document was loaded from (and will be saved to)
    path: PathBuf,

    /// Top-level object, key order preserved
    root: Map<String, Value>,
}

impl ItemsFile {
    /// Load and parse an items file
    pub fn load(path: &Path) -> Result<Self, ItemsFileError> {
        let content = fs::read_to_string(path).map_err(|source| ItemsFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let value: Value =
            serde_json::from_str(&content).map_err(|source| ItemsFileError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_value(path.to_path_buf(), value)
    }

    /// Wrap an already parsed document
    pub fn from_value(path: PathBuf, value: Value) -> Result<Self, ItemsFileError> {
        match value {
            Value::Object(root) => Ok(Self { path, root }),
            _ => Err(ItemsFileError::NotAnObject { path }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    /// The `items` array, if the document has one
    pub fn items(&self) -> Option<&Vec<Value>> {
        self.root.get("items").and_then(Value::as_array)
    }

    pub fn items_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.root.get_mut("items").and_then(Value::as_array_mut)
    }

    /// All non-empty string `path` values, in document order
    pub fn item_paths(&self) -> impl Iterator<Item = &str> {
        self.items()
            .into_iter()
            .flatten()
            .filter_map(item_path)
            .filter(|path| !path.is_empty())
    }

    /// Replace the path of every item whose current path is a key of
    /// `renames`. Each item is rewritten at most once, so chained mappings
    /// (a -> b, b -> c) never cascade. Returns the number of items changed.
    pub fn rewrite_paths(&mut self, renames: &HashMap<&str, &str>) -> usize {
        let Some(items) = self.items_mut() else {
            return 0;
        };

        let mut changed = 0;
        for item in items.iter_mut() {
            let replacement = item_path(item).and_then(|path| renames.get(path)).copied();
            if let Some(new_path) = replacement {
                set_item_path(item, new_path);
                changed += 1;
            }
        }
        changed
    }

    /// Replace the path of the first item whose path equals `old_path`
    pub fn replace_first_path(&mut self, old_path: &str, new_path: &str) -> bool {
        let Some(items) = self.items_mut() else {
            return false;
        };

        match items.iter_mut().find(|item| item_path(item) == Some(old_path)) {
            Some(item) => {
                set_item_path(item, new_path);
                true
            }
            None => false,
        }
    }

    /// Serialize the document the way the content repository stores it:
    /// two-space indentation, non-ASCII kept literal, trailing newline
    pub fn to_pretty_string(&self) -> Result<String, serde_json::Error> {
        let mut content = serde_json::to_string_pretty(&self.root)?;
        content.push('\n');
        Ok(content)
    }

    /// Write the document back to its source path.
    ///
    /// The new content goes to a temporary file in the same directory which
    /// then replaces the original.
    pub fn save(&self) -> Result<(), ItemsFileError> {
        let write_err = |source: std::io::Error| ItemsFileError::Write {
            path: self.path.clone(),
            source,
        };

        let content = self
            .to_pretty_string()
            .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;

        // Keep the original file mode; temp files are created 0600
        if let Ok(metadata) = fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(write_err)?;
        }

        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

/// The `path` field of a single item, when it is a string
pub fn item_path(item: &Value) -> Option<&str> {
    item.get("path").and_then(Value::as_str)
}

fn set_item_path(item: &mut Value, new_path: &str) {
    if let Some(object) = item.as_object_mut() {
        object.insert("path".to_string(), Value::String(new_path.to_string()));
    }
}

/// Find items files below `root` matching a glob `pattern` relative to it
/// (e.g. `**/items.json`). Results are sorted for stable processing order.
pub fn discover(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
    let full_pattern = format!("{}/{}", escaped_root.trim_end_matches('/'), pattern);

    let mut files = Vec::new();
    for entry in glob::glob(&full_pattern)
        .with_context(|| format!("Invalid items file pattern: {}", full_pattern))?
    {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!("Skipping unreadable path {}: {}", e.path().display(), e),
        }
    }

    files.sort();
    Ok(files)
}
