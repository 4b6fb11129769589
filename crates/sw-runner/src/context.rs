//! Runner context built from configuration

use std::path::{Path, PathBuf};
use std::time::Duration;
use sw_core::Config;

/// Everything a run needs, resolved to absolute paths.
#[derive(Debug, Clone)]
pub struct MigratorConfig {
    /// Directory scanned for migration files
    pub migrations_dir: PathBuf,

    /// Progress cursor file
    pub state_file: PathBuf,

    /// Run lock marker
    pub lock_file: PathBuf,

    /// Schema selected before each migration body
    pub schema: Option<String>,

    /// Wrap each file in a transaction
    pub transactional: bool,

    /// Age after which a lock marker is treated as abandoned
    pub stale_lock_after: Option<Duration>,
}

impl MigratorConfig {
    /// Resolve `config` against the project root.
    pub fn from_config(config: &Config, root: &Path) -> Self {
        Self {
            migrations_dir: config.migrations_path_absolute(root),
            state_file: config.state_file_absolute(root),
            lock_file: config.lock_file_absolute(root),
            schema: config.schema.clone(),
            transactional: config.transactional,
            stale_lock_after: config.stale_lock_after(),
        }
    }
}
