//! Result ingestion errors

use thiserror::Error;

/// Errors raised when a backend payload violates the result invariants
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResultError {
    /// Header and type list disagree in length
    #[error("Column count mismatch: {columns} columns but {types} column types")]
    ColumnTypeMismatch { columns: usize, types: usize },

    /// A row does not have one cell per column
    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}
