//! Database configuration and path resolution.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Configuration for database connections.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use voa::DatabaseConfig;
///
/// let config = DatabaseConfig::new("/tmp/voa.db")
///     .with_busy_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the database file.
    pub path: PathBuf,
    /// Busy timeout for database lock contention.
    pub busy_timeout: Duration,
    /// Whether to create the database (and parent directory) if missing.
    pub auto_create: bool,
    /// Whether to open the database in read-only mode.
    pub read_only: bool,
}

impl DatabaseConfig {
    /// Creates a configuration with default settings.
    ///
    /// Defaults: 5000ms busy timeout, auto-create on, read-write.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout: Duration::from_millis(5000),
            auto_create: true,
            read_only: false,
        }
    }

    /// Sets the busy timeout used when the database is locked.
    #[must_use]
    pub const fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Opens the database read-only; implies no auto-create.
    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self.auto_create = false;
        self
    }
}

/// Returns the default data directory (`~/.voa`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_data_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| Error::Validation {
            field: "home_directory".into(),
            message: "cannot determine home directory".into(),
        })?;
    Ok(PathBuf::from(home).join(".voa"))
}

/// Resolves the database file path.
///
/// `$VOA_DATA_DIR/voa.db` when the `VOA_DATA_DIR` environment variable is
/// set, `~/.voa/voa.db` otherwise.
///
/// # Errors
///
/// Returns an error if neither `VOA_DATA_DIR` nor a home directory is
/// available.
pub fn resolve_database_path() -> Result<PathBuf> {
    if let Ok(data_dir) = std::env::var("VOA_DATA_DIR") {
        Ok(PathBuf::from(data_dir).join("voa.db"))
    } else {
        Ok(default_data_dir()?.join("voa.db"))
    }
}
