//! Runtime configuration resolved from the environment.
//!
//! | Variable          | Meaning                              | Default                      |
//! |-------------------|--------------------------------------|------------------------------|
//! | `NOTES_DB_PATH`   | SQLite database file                 | `<temp_dir>/notes.sqlite3`   |
//! | `NOTES_LOG_LEVEL` | `trace` to `error`                   | `debug` (debug) / `info`     |
//! | `NOTES_LOG_DIR`   | Absolute directory for rolling logs  | unset: file logging disabled |
//!
//! Blank values are treated as unset.

use crate::logging::{default_log_level, init_logging, LoggingError};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "NOTES_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "NOTES_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "NOTES_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "notes.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl NotesConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: non_blank(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: non_blank(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: non_blank(LOG_DIR_ENV).map(PathBuf::from),
        }
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns `Ok(false)` when logging is disabled by configuration.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        let Some(log_dir) = &self.log_dir else {
            return Ok(false);
        };
        let log_dir = log_dir.to_str().ok_or_else(|| {
            LoggingError::InvalidDirectory(format!("`{}` is not UTF-8", log_dir.display()))
        })?;
        init_logging(&self.log_level, log_dir)?;
        Ok(true)
    }
}
