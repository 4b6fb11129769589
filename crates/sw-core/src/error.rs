//! Error types for sw-core

use thiserror::Error;

/// Core error type for Stepwise
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Invalid configuration value
    #[error("[C002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C003: Migrations directory missing
    #[error("[C003] Migrations directory not found: {path}")]
    MigrationsDirNotFound { path: String },

    /// C004: Not a 14-digit revision identifier
    #[error("[C004] Invalid revision '{value}': expected 14 digits (YYYYMMDDHHMMSS)")]
    InvalidRevision { value: String },

    /// C005: Two migration files claim the same revision
    #[error("[C005] Duplicate revision {revision}: '{first}' and '{second}'")]
    DuplicateRevision {
        revision: String,
        first: String,
        second: String,
    },

    /// C006: Progress file holds something other than a revision
    #[error("[C006] Progress file '{path}' is corrupt: found '{content}'")]
    ProgressCorrupt { path: String, content: String },

    /// C007: A migration file for the requested revision already exists
    #[error("[C007] Migration file already exists: {path}")]
    MigrationExists { path: String },

    /// C008: New revision would not sort after the existing ones
    #[error("[C008] Revision {revision} is not newer than the latest migration {latest}")]
    RevisionNotNewer { revision: String, latest: String },

    /// C009: IO error
    #[error("[C009] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// C010: IO error with file path context
    #[error("[C010] IO error on '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C011: YAML parse error
    #[error("[C011] Failed to parse config: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

impl CoreError {
    /// Wrap an IO error with the path it happened on.
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        CoreError::IoWithPath {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
