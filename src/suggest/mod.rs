//! Chart Suggestion Engine
//!
//! Proposes visualizations for a query result:
//!
//! - **profile**: Classifies each result column (category, distinct count,
//!   whether its selection was aggregated)
//! - **rules**: Independent heuristics that each may emit a confidence-scored
//!   suggestion with a pre-filled chart configuration
//!
//! Every rule checks its own preconditions against the full set of profiles,
//! so the outcome does not depend on rule order. Suggestions are returned
//! highest confidence first; ties keep rule order.

mod profile;
mod rules;

pub use profile::{profile_columns, ColumnProfile};
pub use rules::{
    suggest, ChartConfig, ChartSuggestion, ChartType, Orientation, MAX_BAR_CATEGORIES,
    MAX_PIE_SLICES,
};
