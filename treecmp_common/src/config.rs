use crate::{HashAlgorithm, ReclaimMode, Result, TreeCmpError, TypeConflictPolicy};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "treecmp.toml";

/// Version control and cache directories skipped unless `default_ignores` is off
pub const DEFAULT_IGNORES: &[&str] = &[
    "RCS",
    "CVS",
    "tags",
    ".git",
    ".hg",
    ".bzr",
    "_darcs",
    "__pycache__",
];

fn default_jobs() -> usize {
    1
}

fn default_true() -> bool {
    true
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ignore patterns in gitignore syntax (e.g., "*.o", "node_modules/")
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Also skip the names in `DEFAULT_IGNORES`
    #[serde(default = "default_true")]
    pub default_ignores: bool,

    /// Whether to follow symbolic links
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Digest used to fingerprint file content
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,

    /// Resolution of names that are a file on one side and a directory on the other
    #[serde(default)]
    pub type_conflict: TypeConflictPolicy,

    /// Hashing worker threads; 0 lets rayon decide
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// What to do with the left copy of identical files
    #[serde(default)]
    pub reclaim: ReclaimMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            default_ignores: true,
            follow_symlinks: false,
            hash_algorithm: HashAlgorithm::default(),
            type_conflict: TypeConflictPolicy::default(),
            jobs: default_jobs(),
            reclaim: ReclaimMode::default(),
        }
    }
}

impl AppConfig {
    /// Built-in ignores (when enabled) followed by the configured patterns
    pub fn effective_ignore_patterns(&self) -> Vec<String> {
        let builtin: &[&str] = if self.default_ignores { DEFAULT_IGNORES } else { &[] };
        builtin
            .iter()
            .map(|name| name.to_string())
            .chain(self.ignore_patterns.iter().cloned())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
    pub exists: bool,
    pub portable: bool,
}

pub fn load_config(prefer_portable: bool) -> Result<LoadedConfig> {
    let (path, portable) = resolve_config_path(prefer_portable)?;
    load_config_from(path, portable)
}

/// Load configuration from an explicit path, falling back to defaults when absent
pub fn load_config_from(path: PathBuf, portable: bool) -> Result<LoadedConfig> {
    let exists = path.exists();

    let config = if exists {
        let data = fs::read_to_string(&path)?;
        toml::from_str(&data).map_err(|e| TreeCmpError::Serialization(e.to_string()))?
    } else {
        AppConfig::default()
    };

    Ok(LoadedConfig {
        config,
        path,
        exists,
        portable,
    })
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let data = toml::to_string_pretty(config)
        .map_err(|e| TreeCmpError::Serialization(e.to_string()))?;
    fs::write(path, data)?;
    Ok(())
}

fn resolve_config_path(prefer_portable: bool) -> Result<(PathBuf, bool)> {
    if let Some(portable_path) = portable_config_path() {
        if prefer_portable || portable_path.exists() {
            return Ok((portable_path, true));
        }
    }

    let dirs = ProjectDirs::from("", "aecs4u", "treecmp")
        .ok_or_else(|| TreeCmpError::Config("Unable to determine config directory".to_string()))?;
    Ok((dirs.config_dir().join(CONFIG_FILE_NAME), false))
}

fn portable_config_path() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
}
