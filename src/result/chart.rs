//! Chart-ready series
//!
//! The renderer consumes one category axis plus one numeric series per value
//! column. Cells that cannot be read as numbers become gaps (`None`) rather
//! than zeros.

use serde::Serialize;

use super::table::QueryResult;

/// Category labels plus one series per measure
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ChartData {
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// A named numeric series aligned with `ChartData::categories`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub data: Vec<Option<f64>>,
}

impl ChartData {
    /// Build chart data from a category column and value columns
    ///
    /// Unknown value columns are skipped; an unknown category column yields
    /// empty chart data. Both are logged.
    pub fn from_result(result: &QueryResult, category: &str, values: &[&str]) -> Self {
        let Some(category_idx) = result.column_index(category) else {
            tracing::warn!(
                category = %category,
                available = ?result.columns,
                "Category column not found in result"
            );
            return Self::default();
        };

        let categories = result
            .column_values(category_idx)
            .map(|v| v.key_string())
            .collect();

        let series = values
            .iter()
            .filter_map(|name| {
                let idx = result.column_index(name);
                if idx.is_none() {
                    tracing::warn!(column = %name, "Value column not found in result");
                }
                idx.map(|idx| ChartSeries {
                    name: name.to_string(),
                    data: result.column_values(idx).map(|v| v.as_f64()).collect(),
                })
            })
            .collect();

        Self { categories, series }
    }

    /// Build chart data using the first column as categories and every other
    /// column as a series (the shape a pivoted result has)
    pub fn from_wide(result: &QueryResult) -> Self {
        match result.columns.split_first() {
            Some((category, rest)) => {
                let values: Vec<&str> = rest.iter().map(String::as_str).collect();
                Self::from_result(result, category, &values)
            }
            None => Self::default(),
        }
    }
}
