//! Query Results
//!
//! Typed representation of what the execution backend returns:
//!
//! - **value**: `CellValue`, the closed variant every cell is converted to at ingestion
//! - **table**: `QueryResult`, a validated column-oriented header plus rows
//! - **chart**: Chart-ready `{categories, series}` data built from a result
//! - **error**: Ingestion errors
//!
//! Raw backend JSON is validated once when it is deserialized, so the pivot
//! transform and suggestion engine can rely on `columns`, `column_types` and
//! every row having the same length.

mod chart;
mod error;
mod table;
mod value;

pub use chart::{ChartData, ChartSeries};
pub use error::ResultError;
pub use table::{QueryResult, RawQueryResult};
pub use value::CellValue;
pub(crate) use value::format_number;
