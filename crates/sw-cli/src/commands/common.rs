//! Shared utilities for CLI commands

use anyhow::{bail, Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sw_core::{Config, DbType, RunLock};
use sw_db::{DbResult, DuckDbBackend};
use sw_runner::{Migrator, MigratorConfig};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and the run lock is released.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally empty: ExitCode is a control-flow mechanism, not a
        // user-facing error.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// A loaded configuration and the directory its relative paths resolve against.
#[derive(Debug, Clone)]
pub(crate) struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    /// Migrator wired to this project's paths and options.
    pub(crate) fn migrator(&self) -> Migrator {
        Migrator::new(MigratorConfig::from_config(&self.config, &self.root))
    }

    /// The run lock, with the configured staleness threshold.
    pub(crate) fn lock(&self) -> RunLock {
        RunLock::new(self.config.lock_file_absolute(&self.root))
            .with_stale_after(self.config.stale_lock_after())
    }

    /// Resolved database path (`:memory:` is kept as-is).
    pub(crate) fn database_path(&self) -> String {
        self.config.database_path_absolute(&self.root)
    }

    /// Open a connection to the configured database.
    pub(crate) fn connect(&self) -> DbResult<DuckDbBackend> {
        match self.config.database.db_type {
            DbType::DuckDb => DuckDbBackend::new(&self.database_path()),
        }
    }
}

/// Load the project configuration, applying global overrides.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = global.project_dir.clone();
    let mut config = match &global.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::load_from_dir(&root).context("Failed to load project configuration")?,
    };

    if let Some(database) = &global.database {
        if database.trim().is_empty() {
            bail!("--database cannot be empty");
        }
        config.database.path = database.clone();
    }

    Ok(Project { root, config })
}

/// Render a duration as `1d 2h 3m 4s`, dropping leading zero units.
pub(crate) fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    let (days, hours, minutes, seconds) = (
        secs / 86_400,
        (secs % 86_400) / 3_600,
        (secs % 3_600) / 60,
        secs % 60,
    );

    let parts = [(days, "d"), (hours, "h"), (minutes, "m")];
    let mut out = String::new();
    for (value, unit) in parts {
        if value > 0 || !out.is_empty() {
            out.push_str(&format!("{value}{unit} "));
        }
    }
    out.push_str(&format!("{seconds}s"));
    out
}

/// Display a path relative to the project root when it lives inside it.
pub(crate) fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
