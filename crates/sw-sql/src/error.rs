//! Error types for sw-sql

use thiserror::Error;

/// SQL tokenizing and splitting errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// SQL could not be tokenized (S001)
    #[error("[S001] SQL tokenize error at line {line}, column {column}: {message}")]
    TokenizeError {
        message: String,
        line: usize,
        column: usize,
    },

    /// Token position outside the source text (S002)
    #[error("[S002] Token position line {line}, column {column} is outside the SQL text")]
    PositionOutOfRange { line: usize, column: usize },

    /// Unknown dialect name (S003)
    #[error("[S003] Unknown SQL dialect: {0}")]
    UnknownDialect(String),
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
