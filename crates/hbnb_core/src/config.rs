//! Shell configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve the store file path and logging settings.
//! - Keep lookup injectable so tests never mutate process environment.
//!
//! # Invariants
//! - Every setting has a default; resolution never fails.
//! - Blank variables are treated as unset.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const STORE_PATH_VAR: &str = "HBNB_STORE_PATH";
pub const LOG_LEVEL_VAR: &str = "HBNB_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "HBNB_LOG_DIR";

/// Store file used when `HBNB_STORE_PATH` is unset.
pub const DEFAULT_STORE_FILE: &str = "file.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// JSON store file; relative paths resolve against the working directory.
    pub store_path: PathBuf,
    pub log_level: String,
    /// Absolute log directory. `None` disables logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl ShellConfig {
    /// Resolves settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves settings through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            store_path: read(STORE_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            log_level: read(LOG_LEVEL_VAR).unwrap_or(defaults.log_level),
            log_dir: read(LOG_DIR_VAR).map(PathBuf::from),
        }
    }
}
