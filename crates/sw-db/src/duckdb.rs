//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use duckdb::Connection;
use std::path::Path;

/// DuckDB database backend
///
/// Owns a single connection; the runner is single-threaded, so no `Mutex`.
pub struct DuckDbBackend {
    conn: Connection,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self { conn })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Check whether a table or view exists (`schema.name` or `name` in `main`)
    #[cfg(any(test, feature = "test-support"))]
    pub fn relation_exists(&self, name: &str) -> DbResult<bool> {
        let (schema, table) = match name.rfind('.') {
            Some(pos) => (&name[..pos], &name[pos + 1..]),
            None => ("main", name),
        };
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            duckdb::params![schema, table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Count the rows a query returns
    #[cfg(any(test, feature = "test-support"))]
    pub fn query_count(&self, sql: &str) -> DbResult<usize> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM ({sql})"), [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| DbError::ExecutionError(format!("row count {count} out of range")))
    }
}

impl Database for DuckDbBackend {
    fn execute(&self, sql: &str) -> DbResult<()> {
        log::debug!("Executing: {sql}");
        // execute_batch accepts statements that return rows as well as DDL.
        self.conn
            .execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
