//! Statement splitting for multi-statement SQL files
//!
//! The body is tokenized with the dialect's sqlparser tokenizer and cut at
//! top-level `;` tokens. Each returned statement is the exact source text
//! between separators (comments included), trimmed, without the `;`.
//! Segments that contain only whitespace and comments are dropped.

use sqlparser::tokenizer::{Location, Token, Tokenizer};

use crate::dialect::SqlDialect;
use crate::error::{SqlError, SqlResult};

/// Split `sql` into its individual statements, in source order.
pub fn split_statements(dialect: &dyn SqlDialect, sql: &str) -> SqlResult<Vec<String>> {
    let tokens = Tokenizer::new(dialect.parser_dialect(), sql)
        .tokenize_with_location()
        .map_err(|e| SqlError::TokenizeError {
            message: e.message.clone(),
            line: e.location.line as usize,
            column: e.location.column as usize,
        })?;

    let index = LineIndex::new(sql);
    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_code = false;

    for token in &tokens {
        match &token.token {
            Token::SemiColon => {
                let end = index.offset(sql, token.span.start)?;
                if has_code {
                    statements.push(sql[start..end].trim().to_string());
                }
                start = end + 1;
                has_code = false;
            }
            Token::Whitespace(_) | Token::EOF => {}
            _ => has_code = true,
        }
    }
    if has_code {
        statements.push(sql[start..].trim().to_string());
    }

    Ok(statements)
}

/// Maps tokenizer locations (1-based line, 1-based char column) to byte
/// offsets.
struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    fn new(sql: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(sql.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    fn offset(&self, sql: &str, location: Location) -> SqlResult<usize> {
        let line = location.line as usize;
        let column = location.column as usize;
        let out_of_range = || SqlError::PositionOutOfRange { line, column };

        let line_start = *line
            .checked_sub(1)
            .and_then(|l| self.line_starts.get(l))
            .ok_or_else(out_of_range)?;
        sql[line_start..]
            .char_indices()
            .nth(column.checked_sub(1).ok_or_else(out_of_range)?)
            .map(|(i, _)| line_start + i)
            .ok_or_else(out_of_range)
    }
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
