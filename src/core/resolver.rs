//! Locating the real file behind a configured path.
//!
//! Configured paths drift from the file system in whitespace encoding
//! (NBSP vs space) and Unicode composition. Resolution tries, in order:
//! 1. the exact path under the content root
//! 2. the normalized path under the content root
//! 3. a scan of the parent directory comparing each file name raw and
//!    normalized against the wanted name

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::normalize::normalize_for_matching;

/// Result of resolving a configured path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The configured path exists verbatim
    Exact(PathBuf),

    /// The normalized path exists
    Normalized(PathBuf),

    /// Found by scanning the parent directory
    Scanned(PathBuf),

    /// No matching file
    NotFound,
}

impl Resolution {
    /// Path of the resolved file, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Resolution::Exact(p) | Resolution::Normalized(p) | Resolution::Scanned(p) => Some(p),
            Resolution::NotFound => None,
        }
    }

    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Resolution::Exact(p) | Resolution::Normalized(p) | Resolution::Scanned(p) => Some(p),
            Resolution::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, Resolution::NotFound)
    }
}

/// Resolves content-relative paths (`files/...`) against a content root
#[derive(Debug, Clone)]
pub struct FileResolver {
    root: PathBuf,
}

impl FileResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The content root paths are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location a relative path would have, without any matching
    pub fn target(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Find the file a configured path refers to
    pub fn resolve(&self, relative: &str) -> Resolution {
        let exact = self.root.join(relative);
        if exact.is_file() {
            return Resolution::Exact(exact);
        }

        let normalized = normalize_for_matching(relative);
        if normalized != relative {
            let candidate = self.root.join(&normalized);
            if candidate.is_file() {
                return Resolution::Normalized(candidate);
            }
        }

        match self.scan_parent(relative, &normalized) {
            Ok(Some(found)) => Resolution::Scanned(found),
            Ok(None) => Resolution::NotFound,
            Err(e) => {
                debug!(path = relative, error = %e, "Directory scan failed");
                Resolution::NotFound
            }
        }
    }

    /// Express a resolved file as a `/`-separated path relative to the root
    pub fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
        parts.map(|parts| parts.join("/"))
    }

    fn scan_parent(&self, relative: &str, normalized: &str) -> io::Result<Option<PathBuf>> {
        let Some((wanted_raw, parent)) = self.scan_directory(relative, normalized) else {
            return Ok(None);
        };
        let wanted_normalized = normalize_for_matching(&wanted_raw);

        let mut entries = fs::read_dir(&parent)?.collect::<io::Result<Vec<_>>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };

            if name == wanted_raw || normalize_for_matching(name) == wanted_normalized {
                debug!(path = relative, found = %path.display(), "Resolved by directory scan");
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    /// Wanted file name and the directory to scan for it. The raw parent is
    /// preferred; a parent whose own name drifted is found via its
    /// normalized spelling.
    fn scan_directory(&self, relative: &str, normalized: &str) -> Option<(String, PathBuf)> {
        let target = self.root.join(relative);
        let wanted = target.file_name()?.to_str()?.to_string();

        let raw_parent = target.parent()?.to_path_buf();
        if raw_parent.is_dir() {
            return Some((wanted, raw_parent));
        }

        let normalized_parent = self.root.join(normalized).parent()?.to_path_buf();
        if normalized_parent != raw_parent && normalized_parent.is_dir() {
            return Some((wanted, normalized_parent));
        }

        None
    }
}
