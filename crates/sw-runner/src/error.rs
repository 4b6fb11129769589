//! Error types for sw-runner

use sw_core::CoreError;
use sw_db::DbError;
use thiserror::Error;

/// Errors that abort a run outside of a single migration's SQL.
///
/// A migration whose statements fail is not an error here; it is reported
/// through [`RunReport::Failed`](crate::RunReport::Failed).
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Could not open the target database (R001)
    #[error("[R001] Could not connect to the database: {0}")]
    Connection(#[source] DbError),

    /// Filesystem, config, cursor or lock failure (R002)
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for RunnerError
pub type RunnerResult<T> = Result<T, RunnerError>;
