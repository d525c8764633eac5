//! Result column profiling

use std::collections::HashSet;

use serde::Serialize;

use crate::format::looks_like_date;
use crate::query::{AggregationType, ColumnSelection};
use crate::result::{CellValue, QueryResult};
use crate::schema::{classify, ColumnCategory};

/// What the suggestion rules know about one result column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    pub name: String,
    pub category: ColumnCategory,
    /// Distinct non-null values in the result
    pub unique_count: usize,
    pub has_aggregation: bool,
}

impl ColumnProfile {
    pub fn is_numeric(&self) -> bool {
        self.category == ColumnCategory::Numeric
    }

    pub fn is_date(&self) -> bool {
        self.category == ColumnCategory::Date
    }

    pub fn is_categorical(&self) -> bool {
        self.category == ColumnCategory::Categorical
    }
}

/// Profile the selected columns of `result`
///
/// A column is matched to the selection whose display name equals the column
/// name, or positionally when the selections line up one-to-one with the
/// columns. With selections given, unmatched columns are left out; with none
/// (raw SQL), every column is profiled. Columns whose type name is not
/// recognised are classified from their values instead.
pub fn profile_columns(result: &QueryResult, selections: &[ColumnSelection]) -> Vec<ColumnProfile> {
    let positional = selections.len() == result.columns.len();

    result
        .columns
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| {
            let selection = selections
                .iter()
                .find(|s| s.display_name() == name)
                .or_else(|| positional.then(|| &selections[idx]));
            if selection.is_none() && !selections.is_empty() {
                return None;
            }
            let aggregation = selection.map(|s| s.aggregation).unwrap_or_default();

            let mut category = classify(result.column_type(idx).unwrap_or_default());
            if category == ColumnCategory::Unknown {
                category = match aggregation {
                    AggregationType::Sum
                    | AggregationType::Avg
                    | AggregationType::Count
                    | AggregationType::CountDistinct => ColumnCategory::Numeric,
                    _ => infer_category(result.column_values(idx)),
                };
            }

            let unique_count = result
                .column_values(idx)
                .filter(|v| !v.is_null())
                .map(CellValue::key_string)
                .collect::<HashSet<_>>()
                .len();

            Some(ColumnProfile {
                name: name.clone(),
                category,
                unique_count,
                has_aggregation: aggregation.is_aggregate(),
            })
        })
        .collect()
}

/// Classify an untyped column by its non-null values
fn infer_category<'a>(values: impl Iterator<Item = &'a CellValue>) -> ColumnCategory {
    let mut seen = false;
    let mut all_numbers = true;
    let mut all_dates = true;

    for value in values {
        match value {
            CellValue::Null => continue,
            CellValue::Number(_) => all_dates = false,
            CellValue::Text(s) => {
                all_numbers = false;
                all_dates &= looks_like_date(s);
            }
            CellValue::Bool(_) => {
                all_numbers = false;
                all_dates = false;
            }
        }
        seen = true;
    }

    match (seen, all_numbers, all_dates) {
        (false, _, _) => ColumnCategory::Unknown,
        (true, true, _) => ColumnCategory::Numeric,
        (true, _, true) => ColumnCategory::Date,
        _ => ColumnCategory::Categorical,
    }
}
