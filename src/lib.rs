//! # Quarry
//!
//! Query construction and result reshaping for analytical dashboards.
//!
//! ## Features
//!
//! - **Query model**: Declarative, serializable query definitions kept valid
//!   by schema-aware construction rules
//! - **Classification**: Backend type names mapped onto date, numeric and
//!   categorical columns
//! - **Pivoting**: Long-format results reshaped into wide tables
//! - **Chart suggestions**: Ranked visualization proposals for a result
//! - **Date patterns**: .NET-style format strings (`MMM dd, yyyy`, `Q yyyy`)
//!
//! ## Modules
//!
//! - [`schema`]: Schema snapshot and column classifier
//! - [`query`]: Query definition model, construction rules and saved queries
//! - [`result`]: Typed query results and chart series
//! - [`pivot`]: Pivot transform
//! - [`suggest`]: Chart suggestion engine
//! - [`format`]: Date pattern interpreter and cell display
//! - [`backend`]: Query execution client
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quarry::backend::{HttpBackend, QueryBackend};
//! use quarry::config::BackendConfig;
//! use quarry::query::{apply, executable, QueryAction, QueryDefinition};
//! use quarry::{pivot, suggest, PivotConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = HttpBackend::new(BackendConfig::default())?;
//!     let schema = backend.fetch_schema().await?;
//!
//!     // Build a query one edit at a time
//!     let mut def = QueryDefinition::new();
//!     for action in [
//!         QueryAction::AddTable { name: "payments".into() },
//!         QueryAction::AddColumn { table_id: "t1".into(), column: "account".into() },
//!         QueryAction::AddColumn { table_id: "t1".into(), column: "month".into() },
//!         QueryAction::AddColumn { table_id: "t1".into(), column: "amount".into() },
//!     ] {
//!         def = apply(&def, &schema, action);
//!     }
//!
//!     if let Some(ready) = executable(&def) {
//!         let result = backend.execute_query(&ready, Some(500)).await?;
//!
//!         let wide = pivot(
//!             &result,
//!             &PivotConfig::new("month", "amount").dimension("account").header_format("MMM yyyy"),
//!         );
//!
//!         for suggestion in suggest(&wide, &[]) {
//!             println!("{} ({:.2}): {}", suggestion.chart_type, suggestion.confidence, suggestion.reason);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod format;
pub mod pivot;
pub mod query;
pub mod result;
pub mod schema;
pub mod suggest;

// Re-export top-level types for convenience
pub use schema::{classify, ColumnCategory, ColumnSchema, DatabaseSchema, Relationship, SchemaTable};

pub use query::{
    apply, executable, AggregationType, ColumnSelection, QueryAction, QueryDefinition,
    QueryError, SavedQuery,
};

pub use result::{CellValue, ChartData, ChartSeries, QueryResult, RawQueryResult, ResultError};

pub use pivot::{pivot, PivotConfig};

pub use suggest::{suggest, ChartConfig, ChartSuggestion, ChartType};

pub use format::{format_cell, format_date};

pub use backend::{BackendError, HttpBackend, QueryBackend};

pub use config::{Config, ConfigError};
