//! Configuration for the content tree locations and rename settings.
//!
//! Configuration sources (highest priority first):
//! 1. `--project <dir>` on the command line (where discovery starts)
//! 2. Environment variable `EXPOZICE_CONTENT` (content directory)
//! 3. Config file (`.expozice/config.yaml`)
//! 4. Defaults (see [`paths`])
//!
//! Config file discovery:
//! - Searches the start directory and its parents for `.expozice/config.yaml`
//! - Paths in the config file are relative to the project root, the parent
//!   of `.expozice/`

pub mod paths;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::manifest::DEFAULT_STRIP_PREFIX;
use crate::core::short_name::{
    ShortNamer, CZECH_STOPWORDS, DEFAULT_MAX_WORDS, DEFAULT_MEDIA_ROOT, DEFAULT_PLACEHOLDER,
};

/// Environment variable overriding the content directory
pub const CONTENT_ENV: &str = "EXPOZICE_CONTENT";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub rename: Option<RenameConfig>,
    #[serde(default)]
    pub compare: Option<CompareConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Content root (relative to the project root)
    pub content: Option<String>,
    pub rename_log: Option<String>,
    pub manifest: Option<String>,
    pub missing_output: Option<String>,
    pub not_existing_output: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameConfig {
    /// Items files to scan, relative to `content/configs`
    pub configs: Option<String>,
    /// Only paths with this prefix are renamed
    pub path_prefix: Option<String>,
    /// Directory whose numbered PDFs keep their panel number
    pub media_root: Option<String>,
    pub max_words: Option<usize>,
    pub placeholder: Option<String>,
    /// Replaces the built-in Czech stopword list
    pub stopwords: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareConfig {
    pub strip_prefix: Option<String>,
}

/// Rename settings with defaults applied
#[derive(Debug, Clone)]
pub struct RenameSettings {
    pub configs_subdir: String,
    pub path_prefix: String,
    pub media_root: String,
    pub max_words: usize,
    pub placeholder: String,
    pub stopwords: Vec<String>,
}

impl Default for RenameSettings {
    fn default() -> Self {
        Self {
            configs_subdir: paths::EXHIBITION_PANELS_DIR.to_string(),
            path_prefix: format!("{}/", DEFAULT_MEDIA_ROOT),
            media_root: DEFAULT_MEDIA_ROOT.to_string(),
            max_words: DEFAULT_MAX_WORDS,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            stopwords: CZECH_STOPWORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl RenameSettings {
    fn from_config(config: Option<&RenameConfig>) -> Self {
        let defaults = Self::default();
        let Some(config) = config else {
            return defaults;
        };

        Self {
            configs_subdir: config.configs.clone().unwrap_or(defaults.configs_subdir),
            path_prefix: config.path_prefix.clone().unwrap_or(defaults.path_prefix),
            media_root: config.media_root.clone().unwrap_or(defaults.media_root),
            max_words: config.max_words.unwrap_or(defaults.max_words),
            placeholder: config.placeholder.clone().unwrap_or(defaults.placeholder),
            stopwords: config.stopwords.clone().unwrap_or(defaults.stopwords),
        }
    }

    /// Build the short name generator these settings describe
    pub fn short_namer(&self) -> ShortNamer {
        ShortNamer::new(self.stopwords.iter().cloned())
            .with_max_words(self.max_words)
            .with_placeholder(self.placeholder.clone())
            .with_media_root(self.media_root.clone())
    }
}

/// Resolved configuration with absolute (or start-relative) paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Directory the relative defaults hang off
    pub project_root: PathBuf,
    /// Content root (`content/`)
    pub content: PathBuf,
    pub rename_log: PathBuf,
    pub manifest: PathBuf,
    pub missing_output: PathBuf,
    pub not_existing_output: PathBuf,
    pub rename: RenameSettings,
    /// Prefix stripped from item paths before comparing with the manifest
    pub strip_prefix: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Defaults for a project rooted at `project_root`
    pub fn defaults(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            content: project_root.join(paths::CONTENT_DIR),
            rename_log: project_root.join(paths::RENAME_LOG),
            manifest: project_root.join(paths::MANIFEST),
            missing_output: project_root.join(paths::MISSING_OUTPUT),
            not_existing_output: project_root.join(paths::NOT_EXISTING_OUTPUT),
            rename: RenameSettings::default(),
            strip_prefix: DEFAULT_STRIP_PREFIX.to_string(),
            config_file: None,
            project_root,
        }
    }

    /// Media directory (`content/files`)
    pub fn files_dir(&self) -> PathBuf {
        self.content.join(paths::FILES_DIR)
    }

    /// Items file tree (`content/configs`)
    pub fn configs_dir(&self) -> PathBuf {
        self.content.join(paths::CONFIGS_DIR)
    }

    /// Chronicle items files (`content/configs/chronicles`)
    pub fn chronicles_dir(&self) -> PathBuf {
        self.configs_dir().join(paths::CHRONICLES_DIR)
    }

    /// Items files scanned by the renamer
    pub fn rename_configs_dir(&self) -> PathBuf {
        self.configs_dir().join(&self.rename.configs_subdir)
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(paths::CONFIG_DIR).join(paths::CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Load configuration starting discovery at `start`, with an optional
/// content directory override (the value of `EXPOZICE_CONTENT`)
pub fn load_config_from(start: &Path, content_override: Option<PathBuf>) -> Result<ResolvedConfig> {
    let config_file = find_config_file(start);

    let mut resolved = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        // Project root is the parent of .expozice/
        let base_dir = config_path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(start);

        let mut resolved = ResolvedConfig::defaults(base_dir);
        let paths = &config.paths;

        if let Some(ref content) = paths.content {
            resolved.content = resolve_path(base_dir, content);
        }
        if let Some(ref log) = paths.rename_log {
            resolved.rename_log = resolve_path(base_dir, log);
        }
        if let Some(ref manifest) = paths.manifest {
            resolved.manifest = resolve_path(base_dir, manifest);
        }
        if let Some(ref missing) = paths.missing_output {
            resolved.missing_output = resolve_path(base_dir, missing);
        }
        if let Some(ref not_existing) = paths.not_existing_output {
            resolved.not_existing_output = resolve_path(base_dir, not_existing);
        }

        resolved.rename = RenameSettings::from_config(config.rename.as_ref());
        if let Some(prefix) = config.compare.and_then(|c| c.strip_prefix) {
            resolved.strip_prefix = prefix;
        }

        resolved.config_file = Some(config_path.clone());
        resolved
    } else {
        ResolvedConfig::defaults(start)
    };

    if let Some(content) = content_override {
        resolved.content = content;
    }

    Ok(resolved)
}

/// Load configuration from all sources. Discovery starts at `project` when
/// given, otherwise at the current directory.
pub fn load_config(project: Option<&Path>) -> Result<ResolvedConfig> {
    let start = match project {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let content_override = std::env::var_os(CONTENT_ENV).map(PathBuf::from);
    load_config_from(&start, content_override)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let config = load_config_from(temp.path(), None).unwrap();

        assert_eq!(config.content, temp.path().join("content"));
        assert_eq!(config.rename_log, temp.path().join("tabule_rename_log.txt"));
        assert_eq!(config.manifest, temp.path().join("samples/parsed_files.txt"));
        assert_eq!(config.rename.path_prefix, "files/Tabule/");
        assert_eq!(config.strip_prefix, "files/");
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join(".expozice");
        std::fs::create_dir_all(&config_dir).unwrap();

        let config_path = config_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
paths:
  content: ./data
  rename_log: logs/renames.txt
rename:
  configs: panels
  max_words: 3
  stopwords: [kostel]
compare:
  strip_prefix: media/
"#
        )
        .unwrap();

        let parsed = load_config_file(&config_path).unwrap();
        assert_eq!(parsed.version, "1.0");
        assert_eq!(parsed.paths.content, Some("./data".to_string()));
        assert_eq!(parsed.rename.as_ref().unwrap().max_words, Some(3));

        // Discovery from a nested directory finds the same file
        let nested = temp.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        let config = load_config_from(&nested, None).unwrap();

        assert_eq!(config.config_file, Some(config_path));
        assert_eq!(config.project_root, temp.path());
        assert_eq!(config.content, temp.path().join("./data"));
        assert_eq!(config.rename_log, temp.path().join("logs/renames.txt"));
        assert_eq!(config.rename_configs_dir(), temp.path().join("./data/configs/panels"));
        assert_eq!(config.rename.max_words, 3);
        assert_eq!(config.rename.stopwords, vec!["kostel".to_string()]);
        assert_eq!(config.rename.placeholder, "tabule");
        assert_eq!(config.strip_prefix, "media/");
    }

    #[test]
    fn test_content_override_wins() {
        let temp = TempDir::new().unwrap();
        let config = load_config_from(temp.path(), Some(PathBuf::from("/srv/content"))).unwrap();

        assert_eq!(config.content, PathBuf::from("/srv/content"));
        assert_eq!(config.files_dir(), PathBuf::from("/srv/content/files"));
        assert_eq!(
            config.chronicles_dir(),
            PathBuf::from("/srv/content/configs/chronicles")
        );
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/./subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }

    #[test]
    fn test_short_namer_from_settings() {
        let settings = RenameSettings {
            max_words: 1,
            ..Default::default()
        };
        let namer = settings.short_namer();
        assert_eq!(namer.max_words(), 1);
        assert_eq!(namer.media_root(), "files/Tabule");
    }
}
