//! sw-sql - SQL layer for Stepwise
//!
//! This crate wraps sqlparser-rs dialects and splits multi-statement
//! migration files into individual statements, respecting string literals,
//! quoted identifiers and comments.

pub mod dialect;
pub mod error;
pub mod splitter;

pub use dialect::{DuckDbDialect, SqlDialect};
pub use error::{SqlError, SqlResult};
pub use splitter::split_statements;
