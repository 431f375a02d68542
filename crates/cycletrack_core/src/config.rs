//! Tracker configuration.
//!
//! # Responsibility
//! - Hold the storage location and key used by a tracker instance.
//! - Normalize host-provided paths before any file is touched.
//!
//! # Invariants
//! - `db_path` is always absolute.
//! - `storage_key` is never empty.

use std::path::{Path, PathBuf};

/// Key under which the serialized record list is stored.
pub const DEFAULT_STORAGE_KEY: &str = "periodTracker";
/// File name used when the host does not provide a database path.
pub const DEFAULT_DB_FILE_NAME: &str = "cycletrack.sqlite3";

/// Storage settings for one tracker instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// SQLite database file holding the key-value table.
    pub db_path: PathBuf,
    /// Key-value entry holding the serialized records.
    pub storage_key: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl TrackerConfig {
    /// Builds a config for the given database path with the default key.
    ///
    /// # Errors
    /// - Returns an error when `db_path` is empty or not absolute.
    pub fn with_db_path(db_path: &str) -> Result<Self, String> {
        Ok(Self {
            db_path: normalize_db_path(db_path)?,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        })
    }

    /// Replaces the storage key.
    ///
    /// # Errors
    /// - Returns an error when `key` is blank.
    pub fn with_storage_key(mut self, key: &str) -> Result<Self, String> {
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err("storage_key cannot be empty".to_string());
        }
        self.storage_key = trimmed.to_string();
        Ok(self)
    }
}

fn normalize_db_path(db_path: &str) -> Result<PathBuf, String> {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return Err("db_path cannot be empty".to_string());
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!("db_path must be an absolute path, got `{trimmed}`"));
    }
    Ok(path.to_path_buf())
}
