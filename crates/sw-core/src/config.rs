//! Configuration types and parsing for stepwise.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file names searched in a project directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["stepwise.yml", "stepwise.yaml"];

/// Project configuration from stepwise.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory containing `<revision>_<description>.sql` files
    #[serde(default = "default_migrations_path")]
    pub migrations_path: String,

    /// File holding the last applied revision
    #[serde(default = "default_state_file")]
    pub state_file: String,

    /// Marker file signalling a run in progress
    #[serde(default = "default_lock_file")]
    pub lock_file: String,

    /// Schema selected with `USE` before each migration body
    #[serde(default)]
    pub schema: Option<String>,

    /// Wrap each migration file in a single transaction
    #[serde(default)]
    pub transactional: bool,

    /// Age after which an existing lock marker is considered abandoned.
    /// Unset means a marker always blocks until cleared by hand.
    #[serde(default)]
    pub stale_lock_after_secs: Option<u64>,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (default)
    #[default]
    DuckDb,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (file-based, or `:memory:`)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            migrations_path: default_migrations_path(),
            state_file: default_state_file(),
            lock_file: default_lock_file(),
            schema: None,
            transactional: false,
            stale_lock_after_secs: None,
            database: DatabaseConfig::default(),
        }
    }
}

fn default_migrations_path() -> String {
    "db/migrate".to_string()
}

fn default_state_file() -> String {
    "data/dbmigrate.txt".to_string()
}

fn default_lock_file() -> String {
    "data/dbmigrate.txt.lock".to_string()
}

fn default_db_path() -> String {
    "stepwise.duckdb".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for stepwise.yml or stepwise.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
            .map(|path| Self::load(&path))
            .unwrap_or_else(|| {
                Err(CoreError::ConfigNotFound {
                    path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
                })
            })
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }
        if self.migrations_path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations_path cannot be empty".to_string(),
            });
        }
        if self.state_file == self.lock_file {
            return Err(CoreError::ConfigInvalid {
                message: "state_file and lock_file must be different files".to_string(),
            });
        }
        if self.stale_lock_after_secs == Some(0) {
            return Err(CoreError::ConfigInvalid {
                message: "stale_lock_after_secs must be greater than zero".to_string(),
            });
        }
        if matches!(&self.schema, Some(s) if s.trim().is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: "schema cannot be empty when set".to_string(),
            });
        }
        Ok(())
    }

    /// Absolute path of the migrations directory
    pub fn migrations_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_path)
    }

    /// Absolute path of the progress file
    pub fn state_file_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.state_file)
    }

    /// Absolute path of the lock marker
    pub fn lock_file_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.lock_file)
    }

    /// Database path resolved against the project root (`:memory:` is kept as-is)
    pub fn database_path_absolute(&self, root: &Path) -> String {
        if self.database.path == ":memory:" {
            return self.database.path.clone();
        }
        root.join(&self.database.path).display().to_string()
    }

    /// Stale-lock threshold as a duration
    pub fn stale_lock_after(&self) -> Option<Duration> {
        self.stale_lock_after_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
