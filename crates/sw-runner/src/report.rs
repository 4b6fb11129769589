//! Structured results of a run

use serde::Serialize;
use std::path::PathBuf;
use sw_core::Revision;

/// A migration that was applied (or skipped as manual) during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedMigration {
    /// Revision that the cursor now points at
    pub revision: Revision,

    /// Description from the filename
    pub name: String,

    /// Number of statements executed
    pub statements: usize,

    /// Skipped because the file is marked for manual installation
    pub manual: bool,

    /// Wall-clock execution time in milliseconds
    pub duration_ms: u64,
}

/// The migration that stopped a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationFailure {
    /// Revision of the failed file
    pub revision: Revision,

    /// Description from the filename
    pub name: String,

    /// 1-based statement index within the file, or 0 when the failure was
    /// outside the file's own statements (schema selection, splitting,
    /// BEGIN/COMMIT)
    pub statement: usize,

    /// Driver error message
    pub message: String,
}

/// Outcome of one [`Migrator::run`](crate::Migrator::run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunReport {
    /// Another run holds the lock; nothing was done
    LockHeld { lock_file: PathBuf },

    /// Every pending migration was applied (possibly none)
    Completed {
        run_id: String,
        applied: Vec<AppliedMigration>,
        cursor: Option<Revision>,
    },

    /// A migration failed; earlier ones in this run remain applied
    Failed {
        run_id: String,
        applied: Vec<AppliedMigration>,
        cursor: Option<Revision>,
        failure: MigrationFailure,
    },
}

impl RunReport {
    /// True when a migration failed and someone needs to look at it.
    pub fn is_failure(&self) -> bool {
        matches!(self, RunReport::Failed { .. })
    }

    /// Migrations applied during this run.
    pub fn applied(&self) -> &[AppliedMigration] {
        match self {
            RunReport::LockHeld { .. } => &[],
            RunReport::Completed { applied, .. } | RunReport::Failed { applied, .. } => applied,
        }
    }

    /// Cursor after the run, when the run got far enough to read it.
    pub fn cursor(&self) -> Option<Revision> {
        match self {
            RunReport::LockHeld { .. } => None,
            RunReport::Completed { cursor, .. } | RunReport::Failed { cursor, .. } => *cursor,
        }
    }
}
