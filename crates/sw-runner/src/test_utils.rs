//! Shared test utilities for sw-runner

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use sw_db::{Database, DbError, DbResult};

/// In-process database that records every statement it receives.
///
/// Statements containing the configured pattern fail with a simulated
/// driver error.
#[derive(Debug, Default)]
pub struct RecordingDatabase {
    executed: RefCell<Vec<String>>,
    fail_when: Option<String>,
}

impl RecordingDatabase {
    /// A database on which every statement succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// A database on which statements containing `pattern` fail
    pub fn failing_on(pattern: &str) -> Self {
        Self {
            executed: RefCell::new(Vec::new()),
            fail_when: Some(pattern.to_string()),
        }
    }

    /// Every statement received so far, in order, including failed ones
    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }
}

impl Database for RecordingDatabase {
    fn execute(&self, sql: &str) -> DbResult<()> {
        self.executed.borrow_mut().push(sql.to_string());
        match &self.fail_when {
            Some(pattern) if sql.contains(pattern.as_str()) => Err(DbError::ExecutionError(
                format!("simulated failure: {sql}"),
            )),
            _ => Ok(()),
        }
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

/// Write a migration file into `dir`, creating the directory if needed.
pub fn write_migration(dir: &Path, file_name: &str, sql: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(file_name);
    std::fs::write(&path, sql).unwrap();
    path
}
