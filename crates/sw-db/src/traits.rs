//! Database trait definition

use crate::error::{DbError, DbResult};
use sw_core::sql_utils::quote_qualified;

/// Connection the migration runner executes against.
///
/// Calls are blocking; the runner is single-threaded and applies one
/// statement at a time so it can report which statement failed.
pub trait Database {
    /// Execute one SQL statement, discarding any result rows
    fn execute(&self, sql: &str) -> DbResult<()>;

    /// Database type identifier for logging and dialect selection
    fn db_type(&self) -> &'static str;

    /// Make `schema` the default for unqualified names
    fn select_schema(&self, schema: &str) -> DbResult<()> {
        self.execute(&format!("USE {}", quote_qualified(schema)))
    }

    /// Open a transaction
    fn begin(&self) -> DbResult<()> {
        self.execute("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))
    }

    /// Commit the open transaction
    fn commit(&self) -> DbResult<()> {
        self.execute("COMMIT")
            .map_err(|e| DbError::TransactionError(format!("COMMIT failed: {e}")))
    }

    /// Roll back the open transaction
    fn rollback(&self) -> DbResult<()> {
        self.execute("ROLLBACK")
            .map_err(|e| DbError::TransactionError(format!("ROLLBACK failed: {e}")))
    }
}

impl<T: Database + ?Sized> Database for &T {
    fn execute(&self, sql: &str) -> DbResult<()> {
        (**self).execute(sql)
    }

    fn db_type(&self) -> &'static str {
        (**self).db_type()
    }

    fn select_schema(&self, schema: &str) -> DbResult<()> {
        (**self).select_schema(schema)
    }

    fn begin(&self) -> DbResult<()> {
        (**self).begin()
    }

    fn commit(&self) -> DbResult<()> {
        (**self).commit()
    }

    fn rollback(&self) -> DbResult<()> {
        (**self).rollback()
    }
}

impl<T: Database + ?Sized> Database for Box<T> {
    fn execute(&self, sql: &str) -> DbResult<()> {
        (**self).execute(sql)
    }

    fn db_type(&self) -> &'static str {
        (**self).db_type()
    }

    fn select_schema(&self, schema: &str) -> DbResult<()> {
        (**self).select_schema(schema)
    }

    fn begin(&self) -> DbResult<()> {
        (**self).begin()
    }

    fn commit(&self) -> DbResult<()> {
        (**self).commit()
    }

    fn rollback(&self) -> DbResult<()> {
        (**self).rollback()
    }
}
