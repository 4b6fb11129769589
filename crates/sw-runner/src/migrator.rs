//! Run orchestration
//!
//! `Idle -> LockAcquiring -> {LockHeld | Running} -> {Completed | Failed}`.
//! The lock guard is held for the whole of `Running` and released on every
//! exit path, including errors.

use std::time::Instant;
use sw_core::{Migration, MigrationSet, ProgressStore, Revision, RunLock};
use sw_db::{Database, DbResult};
use uuid::Uuid;

use crate::context::MigratorConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::executor::{Executor, MigrationOutcome};
use crate::report::{AppliedMigration, MigrationFailure, RunReport};

/// Read-only snapshot of what a run would do right now.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Every discovered migration
    pub migrations: MigrationSet,

    /// Effective cursor (the seed value when nothing is recorded yet)
    pub cursor: Option<Revision>,

    /// True when no cursor is recorded and a run would seed it
    pub needs_seed: bool,
}

impl Plan {
    /// Migrations a run would apply, in order.
    pub fn pending(&self) -> Vec<&Migration> {
        self.migrations.pending_after(self.cursor)
    }
}

/// Applies pending migrations under the run lock.
#[derive(Debug, Clone)]
pub struct Migrator {
    config: MigratorConfig,
    executor: Executor,
    progress: ProgressStore,
    lock: RunLock,
}

impl Migrator {
    /// Build a migrator from its resolved configuration.
    pub fn new(config: MigratorConfig) -> Self {
        let executor = Executor::new(config.schema.clone(), config.transactional);
        let progress = ProgressStore::new(&config.state_file);
        let lock = RunLock::new(&config.lock_file).with_stale_after(config.stale_lock_after);
        Self {
            config,
            executor,
            progress,
            lock,
        }
    }

    /// The configuration this migrator was built with.
    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    /// The progress cursor store.
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    /// The run lock.
    pub fn lock(&self) -> &RunLock {
        &self.lock
    }

    /// Compute the pending set without taking the lock or writing anything.
    pub fn plan(&self) -> RunnerResult<Plan> {
        let migrations = MigrationSet::discover(&self.config.migrations_dir)?;
        let (cursor, needs_seed) = match self.progress.read()? {
            Some(recorded) => (Some(recorded), false),
            None => (migrations.latest(), migrations.latest().is_some()),
        };
        Ok(Plan {
            migrations,
            cursor,
            needs_seed,
        })
    }

    /// Perform one run.
    ///
    /// `connect` is only called when there is something to apply. A held
    /// lock is a normal outcome ([`RunReport::LockHeld`]); a failing
    /// migration halts the run and is reported as [`RunReport::Failed`].
    pub fn run<D, F>(&self, connect: F) -> RunnerResult<RunReport>
    where
        D: Database,
        F: FnOnce() -> DbResult<D>,
    {
        let Some(guard) = self.lock.try_acquire()? else {
            log::info!(
                "Another run holds {}; nothing to do",
                self.config.lock_file.display()
            );
            return Ok(RunReport::LockHeld {
                lock_file: self.config.lock_file.clone(),
            });
        };

        let run_id = Uuid::new_v4().to_string()[..8].to_string();
        let result = self.run_locked(run_id, connect);

        match guard.release() {
            Ok(()) => result,
            Err(release_err) => {
                log::error!("{release_err}");
                // Surface the run's own error first; a stuck lock matters
                // only when the run itself went fine.
                result.and(Err(release_err.into()))
            }
        }
    }

    fn run_locked<D, F>(&self, run_id: String, connect: F) -> RunnerResult<RunReport>
    where
        D: Database,
        F: FnOnce() -> DbResult<D>,
    {
        let migrations = MigrationSet::discover(&self.config.migrations_dir)?;
        let mut cursor = self.progress.read_or_seed(&migrations)?;
        let pending = migrations.pending_after(cursor);

        if pending.is_empty() {
            log::info!(
                "[{run_id}] Up to date at revision {}",
                cursor.map_or_else(|| "(none)".to_string(), |c| c.to_string())
            );
            return Ok(RunReport::Completed {
                run_id,
                applied: Vec::new(),
                cursor,
            });
        }

        log::info!("[{run_id}] {} pending migration(s)", pending.len());
        let db = connect().map_err(RunnerError::Connection)?;

        let mut applied = Vec::with_capacity(pending.len());
        for migration in pending {
            let sql = migration.read_sql()?;
            let started = Instant::now();
            let outcome = self.executor.apply(&sql, &db);
            let duration_ms = started.elapsed().as_millis() as u64;

            let (statements, manual) = match outcome {
                MigrationOutcome::Applied { statements } => (statements, false),
                MigrationOutcome::ManualSkip => {
                    log::warn!(
                        "[{run_id}] {} is marked for manual installation; recording it without executing",
                        migration.file_name()
                    );
                    (0, true)
                }
                MigrationOutcome::Failed { statement, message } => {
                    log::error!(
                        "[{run_id}] {} failed at statement {statement}: {message}",
                        migration.file_name()
                    );
                    return Ok(RunReport::Failed {
                        run_id,
                        applied,
                        cursor,
                        failure: MigrationFailure {
                            revision: migration.revision,
                            name: migration.name.clone(),
                            statement,
                            message,
                        },
                    });
                }
            };

            self.progress.write(migration.revision)?;
            cursor = Some(migration.revision);
            log::info!(
                "[{run_id}] Applied {} ({statements} statement(s), {duration_ms} ms)",
                migration.file_name()
            );
            applied.push(AppliedMigration {
                revision: migration.revision,
                name: migration.name.clone(),
                statements,
                manual,
                duration_ms,
            });
        }

        log::info!(
            "[{run_id}] Applied {} migration(s); now at revision {}",
            applied.len(),
            cursor.map_or_else(|| "(none)".to_string(), |c| c.to_string())
        );
        Ok(RunReport::Completed {
            run_id,
            applied,
            cursor,
        })
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
