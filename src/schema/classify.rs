//! Column classification
//!
//! Maps free-form backend type names onto a small set of semantic categories
//! by case-insensitive substring matching. The rule list is ordered and the
//! first fragment found in the type name wins.

use serde::{Deserialize, Serialize};

use crate::query::AggregationType;

/// Coarse semantic category of a column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ColumnCategory {
    /// Calendar values (dates, times, timestamps)
    Date,
    /// Quantities that can be summed and averaged
    Numeric,
    /// Labels, flags and identifiers
    Categorical,
    /// Type name not recognised; treated permissively
    Unknown,
}

/// Ordered substring rules. Earlier entries take precedence.
const RULES: &[(&str, ColumnCategory)] = &[
    ("timestamp", ColumnCategory::Date),
    ("date", ColumnCategory::Date),
    ("time", ColumnCategory::Date),
    ("int", ColumnCategory::Numeric),
    ("numeric", ColumnCategory::Numeric),
    ("decimal", ColumnCategory::Numeric),
    ("float", ColumnCategory::Numeric),
    ("double", ColumnCategory::Numeric),
    ("real", ColumnCategory::Numeric),
    ("money", ColumnCategory::Numeric),
    ("char", ColumnCategory::Categorical),
    ("text", ColumnCategory::Categorical),
    ("varchar", ColumnCategory::Categorical),
    ("bool", ColumnCategory::Categorical),
    ("uuid", ColumnCategory::Categorical),
];

const NUMERIC_AGGREGATIONS: &[AggregationType] = &[
    AggregationType::None,
    AggregationType::Sum,
    AggregationType::Avg,
    AggregationType::Count,
    AggregationType::CountDistinct,
    AggregationType::Min,
    AggregationType::Max,
];

const DATE_AGGREGATIONS: &[AggregationType] = &[
    AggregationType::None,
    AggregationType::Count,
    AggregationType::CountDistinct,
    AggregationType::Min,
    AggregationType::Max,
];

const LABEL_AGGREGATIONS: &[AggregationType] = &[
    AggregationType::None,
    AggregationType::Count,
    AggregationType::CountDistinct,
];

/// Classify a backend data-type string
pub fn classify(data_type: &str) -> ColumnCategory {
    let lowered = data_type.to_lowercase();
    RULES
        .iter()
        .find(|(fragment, _)| lowered.contains(fragment))
        .map(|(_, category)| *category)
        .unwrap_or(ColumnCategory::Unknown)
}

impl ColumnCategory {
    /// Aggregations the backend accepts for a column of this category
    pub fn legal_aggregations(&self) -> &'static [AggregationType] {
        match self {
            Self::Numeric => NUMERIC_AGGREGATIONS,
            Self::Date => DATE_AGGREGATIONS,
            Self::Categorical | Self::Unknown => LABEL_AGGREGATIONS,
        }
    }

    /// Check whether an aggregation is legal for this category
    pub fn allows(&self, aggregation: AggregationType) -> bool {
        self.legal_aggregations().contains(&aggregation)
    }

    /// Whether values of this category make sensible pivot column headers
    pub fn is_pivotable(&self) -> bool {
        !matches!(self, Self::Numeric)
    }

    /// Whether a date-truncation interval may be applied
    pub fn is_date_truncatable(&self) -> bool {
        matches!(self, Self::Date)
    }
}

impl std::fmt::Display for ColumnCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date => write!(f, "date"),
            Self::Numeric => write!(f, "numeric"),
            Self::Categorical => write!(f, "categorical"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
