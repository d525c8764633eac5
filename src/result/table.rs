//! Query result table

use serde::{Deserialize, Serialize};

use super::error::ResultError;
use super::value::CellValue;

/// Result payload exactly as the backend sends it
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQueryResult {
    pub columns: Vec<String>,
    #[serde(default)]
    pub column_types: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    pub row_count: Option<usize>,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub execution_time_ms: u64,
}

/// A validated query result
///
/// `columns.len() == column_types.len()` and every row holds one cell per
/// column.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", try_from = "RawQueryResult")]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub column_types: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub row_count: usize,
    pub truncated: bool,
    pub execution_time_ms: u64,
}

impl QueryResult {
    /// Build a result from already-typed rows, checking the shape invariants
    pub fn new(
        columns: Vec<String>,
        column_types: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self, ResultError> {
        check_shape(columns.len(), column_types.len(), rows.iter().map(Vec::len))?;

        Ok(Self {
            row_count: rows.len(),
            columns,
            column_types,
            rows,
            truncated: false,
            execution_time_ms: 0,
        })
    }

    /// Validate and convert a raw backend payload
    pub fn from_raw(raw: RawQueryResult) -> Result<Self, ResultError> {
        let mut column_types = raw.column_types;
        if column_types.is_empty() && !raw.columns.is_empty() {
            // Raw SQL endpoints may omit types; unknown types classify permissively
            tracing::debug!(columns = raw.columns.len(), "Result carried no column types");
            column_types = vec![String::new(); raw.columns.len()];
        }

        check_shape(
            raw.columns.len(),
            column_types.len(),
            raw.rows.iter().map(Vec::len),
        )?;

        let rows: Vec<Vec<CellValue>> = raw
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(CellValue::from).collect())
            .collect();

        Ok(Self {
            row_count: raw.row_count.unwrap_or(rows.len()),
            columns: raw.columns,
            column_types,
            rows,
            truncated: raw.truncated,
            execution_time_ms: raw.execution_time_ms,
        })
    }

    /// Builder method: record backend metadata
    pub fn with_meta(mut self, truncated: bool, execution_time_ms: u64) -> Self {
        self.truncated = truncated;
        self.execution_time_ms = execution_time_ms;
        self
    }

    /// Number of rows held
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Backend type name of a column
    pub fn column_type(&self, index: usize) -> Option<&str> {
        self.column_types.get(index).map(String::as_str)
    }

    /// All cells of one column, top to bottom
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}

impl TryFrom<RawQueryResult> for QueryResult {
    type Error = ResultError;

    fn try_from(raw: RawQueryResult) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

fn check_shape(
    columns: usize,
    types: usize,
    row_lengths: impl Iterator<Item = usize>,
) -> Result<(), ResultError> {
    if columns != types {
        return Err(ResultError::ColumnTypeMismatch { columns, types });
    }

    for (row, found) in row_lengths.enumerate() {
        if found != columns {
            return Err(ResultError::RaggedRow {
                row,
                expected: columns,
                found,
            });
        }
    }

    Ok(())
}
