//! Query Construction
//!
//! The analytical query model and the rules that edit it:
//!
//! - **definition**: `QueryDefinition` and its parts (tables, joins, column
//!   selections, filters, group-by, sort, limit/offset)
//! - **rules**: Schema-aware construction rules applied as pure
//!   `(definition, schema, action) → definition` functions
//! - **saved**: Versioned JSON envelope for saved queries
//!
//! # Example
//!
//! ```rust,ignore
//! use quarry::query::{apply, executable, QueryAction, QueryDefinition};
//!
//! let def = apply(&QueryDefinition::new(), &schema, QueryAction::AddTable { name: "orders".into() });
//! let def = apply(&def, &schema, QueryAction::AddColumn { table_id: "t1".into(), column: "amount".into() });
//!
//! if let Some(ready) = executable(&def) {
//!     let result = backend.execute_query(&ready, Some(100)).await?;
//! }
//! ```

mod definition;
mod error;
mod rules;
mod saved;

pub use definition::{
    AggregationType, ColumnRef, ColumnSelection, DateTruncInterval, FilterDefinition,
    FilterOperator, FilterValue, GroupByDefinition, JoinDefinition, JoinType, OperatorArity,
    QueryDefinition, QueryTable, SortDefinition, SortDirection,
};
pub use error::QueryError;
pub use rules::{
    aggregation_options, apply, available_tables, column_category, executable,
    group_by_column_options, next_table_id, sort_column_options, suggest_related_tables,
    ColumnOption, QueryAction, RelatedTable, MAX_RELATED_SUGGESTIONS,
};
pub use saved::{SavedQuery, CURRENT_VERSION};
