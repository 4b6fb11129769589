//! sw-runner - Migration runner for Stepwise
//!
//! Ties the revision index, progress cursor and run lock together: take the
//! lock, work out which migrations are pending, apply them one file at a
//! time in revision order, and record progress after each success.

pub mod context;
pub mod error;
pub mod executor;
pub mod migrator;
pub mod report;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use context::MigratorConfig;
pub use error::{RunnerError, RunnerResult};
pub use executor::{Executor, MigrationOutcome};
pub use migrator::{Migrator, Plan};
pub use report::{AppliedMigration, MigrationFailure, RunReport};
