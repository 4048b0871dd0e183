//! Application configuration.
//!
//! # Invariants
//! - Every path the app writes to is derived from `data_dir`.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default database file name inside `data_dir`.
pub const DEFAULT_DB_FILE_NAME: &str = "words_database.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Settings supplied by the host at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Absolute directory holding the database and logs.
    pub data_dir: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    #[serde(default = "default_log_level_owned")]
    pub log_level: String,
    /// Overrides `DEFAULT_DB_FILE_NAME`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_file_name: Option<String>,
}

impl AppConfig {
    /// Builds a config with the build-mode default log level.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            log_level: default_log_level_owned(),
            db_file_name: None,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(
            self.db_file_name
                .as_deref()
                .unwrap_or(DEFAULT_DB_FILE_NAME),
        )
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}

fn default_log_level_owned() -> String {
    default_log_level().to_string()
}
