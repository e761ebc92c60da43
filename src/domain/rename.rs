//! Old -> new path pairs shared by the renamer, the rename log and replay.

use std::fmt;

/// Separator between the new and the old path in a rename log line
pub const LOG_SEPARATOR: &str = " <- ";

/// A single planned or applied rename, both paths relative to the content root
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenameEntry {
    /// Path after the rename (e.g. `files/Tabule/1-praveka.pdf`)
    pub new_path: String,

    /// Path before the rename, as stored in the items files
    pub old_path: String,
}

impl RenameEntry {
    pub fn new(new_path: impl Into<String>, old_path: impl Into<String>) -> Self {
        Self {
            new_path: new_path.into(),
            old_path: old_path.into(),
        }
    }

    /// True when the generated name equals the current one
    pub fn is_noop(&self) -> bool {
        self.new_path == self.old_path
    }
}

/// Renders the log line form: `new_path <- old_path`
impl fmt::Display for RenameEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.new_path, LOG_SEPARATOR, self.old_path)
    }
}

/// Replace the last component of a `/`-separated relative path
pub fn with_file_name(path: &str, file_name: &str) -> String {
    match path.rsplit_once('/') {
        Some((parent, _)) => format!("{}/{}", parent, file_name),
        None => file_name.to_string(),
    }
}

/// Last component of a `/`-separated relative path
pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}
