//! Applies a single migration file
//!
//! Statements run one at a time so a failure can be pinned to its 1-based
//! position in the file. Without `transactional`, statements that succeeded
//! before a failure stay committed: a partly applied file can leave the
//! schema in a mixed state and needs an operator to repair it.

use sw_core::Migration;
use sw_db::Database;
use sw_sql::dialect::dialect_for;
use sw_sql::split_statements;

/// Classification of one migration's execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Every statement succeeded
    Applied { statements: usize },

    /// Marked for manual installation; nothing was executed
    ManualSkip,

    /// Execution stopped at `statement` (1-based, 0 when the failure was
    /// outside the file's own statements)
    Failed { statement: usize, message: String },
}

impl MigrationOutcome {
    fn failed_outside_body(message: impl Into<String>) -> Self {
        MigrationOutcome::Failed {
            statement: 0,
            message: message.into(),
        }
    }
}

/// Executes migration bodies against a [`Database`].
#[derive(Debug, Clone, Default)]
pub struct Executor {
    schema: Option<String>,
    transactional: bool,
}

impl Executor {
    /// Create an executor that selects `schema` before each body and
    /// optionally wraps each body in a transaction.
    pub fn new(schema: Option<String>, transactional: bool) -> Self {
        Self {
            schema,
            transactional,
        }
    }

    /// Apply one migration body.
    pub fn apply(&self, sql: &str, db: &dyn Database) -> MigrationOutcome {
        if Migration::is_manual(sql) {
            return MigrationOutcome::ManualSkip;
        }

        // A file may still switch schema itself with its own USE.
        if let Some(schema) = &self.schema {
            if let Err(e) = db.select_schema(schema) {
                return MigrationOutcome::failed_outside_body(format!(
                    "could not select schema '{schema}': {e}"
                ));
            }
        }

        let statements =
            match dialect_for(db.db_type()).and_then(|d| split_statements(d.as_ref(), sql)) {
                Ok(statements) => statements,
                Err(e) => return MigrationOutcome::failed_outside_body(e.to_string()),
            };

        if self.transactional {
            if let Err(e) = db.begin() {
                return MigrationOutcome::failed_outside_body(e.to_string());
            }
        }

        for (i, statement) in statements.iter().enumerate() {
            if let Err(e) = db.execute(statement) {
                if self.transactional {
                    rollback(db);
                }
                return MigrationOutcome::Failed {
                    statement: i + 1,
                    message: e.to_string(),
                };
            }
        }

        if self.transactional {
            if let Err(e) = db.commit() {
                rollback(db);
                return MigrationOutcome::failed_outside_body(e.to_string());
            }
        }

        MigrationOutcome::Applied {
            statements: statements.len(),
        }
    }
}

fn rollback(db: &dyn Database) {
    if let Err(e) = db.rollback() {
        log::warn!("Rollback after failed migration also failed: {e}");
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
