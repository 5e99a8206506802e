//! Configuration for `wf`.
//!
//! The only setting is the location of the database file. It is resolved in
//! order from an explicit path, the `WF_DB_PATH` environment variable, and
//! finally `~/wf.db`.

use std::path::{Path, PathBuf};

/// The default database filename.
pub const DEFAULT_DB_NAME: &str = "wf.db";

/// Environment variable that overrides the database location.
pub const DB_PATH_ENV: &str = "WF_DB_PATH";

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Location of the `SQLite` database file.
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve the configuration, preferring `explicit` when given.
    #[must_use]
    pub fn resolve(explicit: Option<&Path>) -> Self {
        let db_path = explicit.map_or_else(default_db_path, Path::to_path_buf);
        Self { db_path }
    }

    /// Resolve the configuration from the environment alone.
    #[must_use]
    pub fn from_env() -> Self {
        Self::resolve(None)
    }
}

/// Get the database path from the environment, falling back to the home directory.
///
/// Returns `wf.db` relative to the working directory if the home directory
/// cannot be determined.
#[must_use]
pub fn default_db_path() -> PathBuf {
    if let Some(path) = std::env::var_os(DB_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }

    dirs::home_dir()
        .map_or_else(|| PathBuf::from(DEFAULT_DB_NAME), |home| home.join(DEFAULT_DB_NAME))
}
