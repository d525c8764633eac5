//! Pivot Transform
//!
//! Reshapes a long-format result (one row per dimension/category pair) into a
//! wide one (one row per dimension group, one column per category).
//!
//! Distinct pivot values become columns in lexicographic order of their string
//! form, so numeric-looking values order as text (`"10"` before `"2"`).
//! Combinations with no source row are `Null`, never zero.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::format::{format_date_string, looks_like_date};
use crate::result::{CellValue, QueryResult};

/// Which columns to pivot on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotConfig {
    /// Column whose distinct values become output columns
    pub pivot_column: String,
    /// Column whose cells fill the new columns
    pub value_column: String,
    /// Columns that identify an output row
    #[serde(default)]
    pub dimension_columns: Vec<String>,
    /// Date pattern applied to headers that look like ISO dates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot_column_format: Option<String>,
}

impl PivotConfig {
    pub fn new(pivot_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        Self {
            pivot_column: pivot_column.into(),
            value_column: value_column.into(),
            ..Default::default()
        }
    }

    /// Builder method: add a dimension column
    pub fn dimension(mut self, column: impl Into<String>) -> Self {
        self.dimension_columns.push(column.into());
        self
    }

    /// Builder method: set the header date pattern
    pub fn header_format(mut self, pattern: impl Into<String>) -> Self {
        self.pivot_column_format = Some(pattern.into());
        self
    }
}

static NULL_CELL: CellValue = CellValue::Null;

/// Cell `idx` of `row`; short rows read as `Null`
fn cell(row: &[CellValue], idx: usize) -> &CellValue {
    row.get(idx).unwrap_or(&NULL_CELL)
}

/// Rows sharing one dimension tuple
struct Group {
    dimensions: Vec<CellValue>,
    cells: HashMap<String, CellValue>,
}

/// Pivot `result` from long to wide format
///
/// Returns the input unchanged when the pivot or value column is missing.
/// Dimension columns that do not exist are skipped.
pub fn pivot(result: &QueryResult, config: &PivotConfig) -> QueryResult {
    let (pivot_idx, value_idx) = match (
        result.column_index(&config.pivot_column),
        result.column_index(&config.value_column),
    ) {
        (Some(p), Some(v)) => (p, v),
        _ => {
            warn!(
                pivot_column = %config.pivot_column,
                value_column = %config.value_column,
                available = ?result.columns,
                "Pivot column not found in result, leaving it unchanged"
            );
            return result.clone();
        }
    };

    let dimension_idx: Vec<usize> = config
        .dimension_columns
        .iter()
        .filter_map(|name| {
            let idx = result.column_index(name);
            if idx.is_none() {
                warn!(column = %name, "Dimension column not found in result, skipping");
            }
            idx
        })
        .collect();

    let pivot_values: Vec<String> = result
        .rows
        .iter()
        .map(|row| cell(row, pivot_idx).key_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // Groups keep the order their first row appeared in
    let mut groups: Vec<Group> = Vec::new();
    let mut group_index: HashMap<Vec<String>, usize> = HashMap::new();

    for row in &result.rows {
        let key: Vec<String> = dimension_idx.iter().map(|&i| cell(row, i).key_string()).collect();
        let slot = *group_index.entry(key).or_insert_with(|| {
            groups.push(Group {
                dimensions: dimension_idx.iter().map(|&i| cell(row, i).clone()).collect(),
                cells: HashMap::new(),
            });
            groups.len() - 1
        });

        // A repeated (group, pivot value) pair keeps the last row's value
        groups[slot]
            .cells
            .insert(cell(row, pivot_idx).key_string(), cell(row, value_idx).clone());
    }

    let mut columns: Vec<String> = dimension_idx
        .iter()
        .map(|&i| result.columns[i].clone())
        .collect();
    columns.extend(
        pivot_values
            .iter()
            .map(|value| header(value, config.pivot_column_format.as_deref())),
    );

    let mut column_types: Vec<String> = dimension_idx
        .iter()
        .map(|&i| result.column_type(i).unwrap_or_default().to_string())
        .collect();
    let value_type = result.column_type(value_idx).unwrap_or_default().to_string();
    column_types.extend(std::iter::repeat(value_type).take(pivot_values.len()));

    let rows: Vec<Vec<CellValue>> = groups
        .into_iter()
        .map(|mut group| {
            let mut row = group.dimensions;
            row.extend(
                pivot_values
                    .iter()
                    .map(|value| group.cells.remove(value).unwrap_or_default()),
            );
            row
        })
        .collect();

    debug!(
        input_rows = result.rows.len(),
        output_rows = rows.len(),
        pivot_columns = pivot_values.len(),
        "Pivoted result"
    );

    QueryResult {
        row_count: rows.len(),
        columns,
        column_types,
        rows,
        truncated: result.truncated,
        execution_time_ms: result.execution_time_ms,
    }
}

fn header(value: &str, pattern: Option<&str>) -> String {
    match pattern {
        Some(pattern) if looks_like_date(value) => {
            format_date_string(value, pattern).unwrap_or_else(|| value.to_string())
        }
        _ => value.to_string(),
    }
}
