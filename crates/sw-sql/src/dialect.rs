//! SQL dialect abstraction

use sqlparser::dialect::{Dialect, DuckDbDialect as SqlParserDuckDb};

use crate::error::{SqlError, SqlResult};

/// Trait for SQL dialect implementations
pub trait SqlDialect: Send + Sync {
    /// Get the underlying sqlparser dialect
    fn parser_dialect(&self) -> &dyn Dialect;

    /// Get the dialect name
    fn name(&self) -> &'static str;
}

/// DuckDB SQL dialect
pub struct DuckDbDialect {
    dialect: SqlParserDuckDb,
}

impl DuckDbDialect {
    /// Create a new DuckDB dialect
    pub fn new() -> Self {
        Self {
            dialect: SqlParserDuckDb {},
        }
    }
}

impl Default for DuckDbDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for DuckDbDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn name(&self) -> &'static str {
        "duckdb"
    }
}

/// Look up a dialect by the database type name used in configuration.
pub fn dialect_for(name: &str) -> SqlResult<Box<dyn SqlDialect>> {
    match name.to_lowercase().as_str() {
        "duckdb" => Ok(Box::new(DuckDbDialect::new())),
        _ => Err(SqlError::UnknownDialect(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_for_duckdb() {
        assert_eq!(dialect_for("DuckDB").unwrap().name(), "duckdb");
    }

    #[test]
    fn test_dialect_for_unknown() {
        assert!(matches!(
            dialect_for("oracle"),
            Err(SqlError::UnknownDialect(_))
        ));
    }
}
