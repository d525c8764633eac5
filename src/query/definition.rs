//! Query Definition Model
//!
//! The declarative, JSON-serializable description of an analytical query that
//! is exchanged with the execution backend and persisted for saved queries
//! and widgets.
//!
//! # Example
//!
//! ```text
//! {
//!   "tables":  [{"id": "t1", "name": "orders"}],
//!   "columns": [{"tableId": "t1", "column": "created_at", "aggregation": "none", "dateTrunc": "month"},
//!               {"tableId": "t1", "column": "amount", "aggregation": "sum"}],
//!   "groupBy": [{"tableId": "t1", "column": "created_at"}],
//!   "limit":   100
//! }
//! ```
//!
//! Values are never mutated in place by the construction rules; every edit
//! produces a new `QueryDefinition`.

use serde::{Deserialize, Serialize};

use crate::result::CellValue;

/// A complete query definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryDefinition {
    pub tables: Vec<QueryTable>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<JoinDefinition>,
    pub columns: Vec<ColumnSelection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<GroupByDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<SortDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl QueryDefinition {
    /// Create an empty definition
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a table by its local id
    pub fn table(&self, id: &str) -> Option<&QueryTable> {
        self.tables.iter().find(|t| t.id == id)
    }

    /// Whether a table with the given schema name is already part of the query
    pub fn has_table_named(&self, name: &str) -> bool {
        self.tables.iter().any(|t| t.name == name)
    }

    /// Whether the given local table id exists
    pub fn has_table_id(&self, id: &str) -> bool {
        self.tables.iter().any(|t| t.id == id)
    }

    /// Check if nothing has been selected yet
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.columns.is_empty()
    }
}

/// A table participating in the query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryTable {
    /// Locally unique handle such as `t1`
    pub id: String,
    /// Table name in the schema
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl QueryTable {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            alias: None,
        }
    }

    /// Builder method: set an alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// A `(table id, column)` reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef<'a> {
    pub table_id: &'a str,
    pub column: &'a str,
}

/// A selected output column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSelection {
    pub table_id: String,
    /// Column name; empty while the user has not picked one yet
    pub column: String,
    #[serde(default)]
    pub aggregation: AggregationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_trunc: Option<DateTruncInterval>,
}

impl ColumnSelection {
    /// Create a plain (non-aggregated) selection
    pub fn new(table_id: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            column: column.into(),
            aggregation: AggregationType::None,
            alias: None,
            date_trunc: None,
        }
    }

    /// Builder method: set the aggregation
    pub fn aggregate(mut self, aggregation: AggregationType) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Builder method: set an alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Builder method: truncate a date column
    pub fn truncate(mut self, interval: DateTruncInterval) -> Self {
        self.date_trunc = Some(interval);
        self
    }

    pub fn column_ref(&self) -> ColumnRef<'_> {
        ColumnRef {
            table_id: &self.table_id,
            column: &self.column,
        }
    }

    /// A row the user added but has not filled in yet
    pub fn is_placeholder(&self) -> bool {
        self.column.is_empty() && self.aggregation == AggregationType::None
    }

    /// Aggregated selections need a column to aggregate over
    pub fn is_complete(&self) -> bool {
        !self.column.is_empty()
    }

    /// Output column name (alias or column name)
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.column)
    }
}

/// Aggregation applied to a selected column
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AggregationType {
    /// Raw column value
    #[default]
    None,
    Sum,
    Avg,
    Count,
    CountDistinct,
    Min,
    Max,
}

impl AggregationType {
    /// All aggregations in display order
    pub fn all() -> &'static [AggregationType] {
        &[
            Self::None,
            Self::Sum,
            Self::Avg,
            Self::Count,
            Self::CountDistinct,
            Self::Min,
            Self::Max,
        ]
    }

    /// Whether this is an actual aggregate function
    pub fn is_aggregate(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" | "" => Some(Self::None),
            "sum" => Some(Self::Sum),
            "avg" | "average" => Some(Self::Avg),
            "count" => Some(Self::Count),
            "count_distinct" | "countdistinct" => Some(Self::CountDistinct),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            _ => None,
        }
    }
}

impl std::fmt::Display for AggregationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Sum => write!(f, "SUM"),
            Self::Avg => write!(f, "AVG"),
            Self::Count => write!(f, "COUNT"),
            Self::CountDistinct => write!(f, "COUNT DISTINCT"),
            Self::Min => write!(f, "MIN"),
            Self::Max => write!(f, "MAX"),
        }
    }
}

/// Interval a date column is truncated to before grouping
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DateTruncInterval {
    Hour,
    Day,
    /// Weeks start on Monday
    Week,
    Month,
    Quarter,
    Year,
}

impl DateTruncInterval {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hour" | "h" => Some(Self::Hour),
            "day" | "d" => Some(Self::Day),
            "week" | "w" => Some(Self::Week),
            "month" | "m" => Some(Self::Month),
            "quarter" | "q" => Some(Self::Quarter),
            "year" | "y" => Some(Self::Year),
            _ => None,
        }
    }
}

impl std::fmt::Display for DateTruncInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hour => write!(f, "hour"),
            Self::Day => write!(f, "day"),
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
            Self::Quarter => write!(f, "quarter"),
            Self::Year => write!(f, "year"),
        }
    }
}

/// A WHERE condition on one column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterDefinition {
    pub table_id: String,
    pub column: String,
    pub operator: FilterOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
}

impl FilterDefinition {
    /// Create a filter without a value
    pub fn new(
        table_id: impl Into<String>,
        column: impl Into<String>,
        operator: FilterOperator,
    ) -> Self {
        Self {
            table_id: table_id.into(),
            column: column.into(),
            operator,
            value: None,
        }
    }

    /// Builder method: compare against a single value
    pub fn scalar(mut self, value: impl Into<CellValue>) -> Self {
        self.value = Some(FilterValue::Scalar(value.into()));
        self
    }

    /// Builder method: compare against a list (`in`, `not_in`, `between`)
    pub fn list<V: Into<CellValue>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.value = Some(FilterValue::List(
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Whether the value has the shape the operator needs
    pub fn is_complete(&self) -> bool {
        if self.column.is_empty() {
            return false;
        }

        match (self.operator.arity(), &self.value) {
            (OperatorArity::None, _) => true,
            (OperatorArity::Scalar, Some(FilterValue::Scalar(v))) => match v {
                CellValue::Null => false,
                CellValue::Text(s) if self.operator.is_pattern() => !s.is_empty(),
                _ => true,
            },
            (OperatorArity::List, Some(FilterValue::List(values))) => !values.is_empty(),
            (OperatorArity::Pair, Some(FilterValue::List(values))) => {
                values.len() == 2 && values.iter().all(|v| !v.is_null())
            }
            _ => false,
        }
    }
}

/// Value a filter compares against
///
/// Scalar for comparison operators, a list for `in_`/`not_in`, a two-element
/// list for `between`, absent for null checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FilterValue {
    List(Vec<CellValue>),
    Scalar(CellValue),
}

impl FilterValue {
    /// The bounds of a `between` filter
    pub fn as_range(&self) -> Option<(&CellValue, &CellValue)> {
        match self {
            Self::List(values) if values.len() == 2 => Some((&values[0], &values[1])),
            _ => None,
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    #[serde(rename = "in_", alias = "in")]
    In,
    NotIn,
    Between,
    IsNull,
    IsNotNull,
}

/// How many operands an operator takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorArity {
    None,
    Scalar,
    List,
    Pair,
}

impl FilterOperator {
    pub fn arity(&self) -> OperatorArity {
        match self {
            Self::IsNull | Self::IsNotNull => OperatorArity::None,
            Self::In | Self::NotIn => OperatorArity::List,
            Self::Between => OperatorArity::Pair,
            _ => OperatorArity::Scalar,
        }
    }

    /// `LIKE`-style pattern operators
    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::Like | Self::NotLike)
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "=" | "==" | "eq" => Some(Self::Eq),
            "!=" | "<>" | "neq" => Some(Self::Neq),
            ">" | "gt" => Some(Self::Gt),
            ">=" | "gte" => Some(Self::Gte),
            "<" | "lt" => Some(Self::Lt),
            "<=" | "lte" => Some(Self::Lte),
            "like" => Some(Self::Like),
            "not like" | "not_like" => Some(Self::NotLike),
            "in" | "in_" => Some(Self::In),
            "not in" | "not_in" => Some(Self::NotIn),
            "between" => Some(Self::Between),
            "is null" | "is_null" => Some(Self::IsNull),
            "is not null" | "is_not_null" => Some(Self::IsNotNull),
            _ => None,
        }
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Neq => write!(f, "!="),
            Self::Gt => write!(f, ">"),
            Self::Gte => write!(f, ">="),
            Self::Lt => write!(f, "<"),
            Self::Lte => write!(f, "<="),
            Self::Like => write!(f, "LIKE"),
            Self::NotLike => write!(f, "NOT LIKE"),
            Self::In => write!(f, "IN"),
            Self::NotIn => write!(f, "NOT IN"),
            Self::Between => write!(f, "BETWEEN"),
            Self::IsNull => write!(f, "IS NULL"),
            Self::IsNotNull => write!(f, "IS NOT NULL"),
        }
    }
}

/// A join between two query tables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JoinDefinition {
    pub from_table_id: String,
    pub from_column: String,
    pub to_table_id: String,
    pub to_column: String,
    #[serde(default)]
    pub join_type: JoinType,
}

impl JoinDefinition {
    pub fn is_complete(&self) -> bool {
        !self.from_column.is_empty() && !self.to_column.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    Inner,
    #[default]
    Left,
    Right,
    Full,
}

impl std::fmt::Display for JoinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inner => write!(f, "INNER JOIN"),
            Self::Left => write!(f, "LEFT JOIN"),
            Self::Right => write!(f, "RIGHT JOIN"),
            Self::Full => write!(f, "FULL JOIN"),
        }
    }
}

/// An ORDER BY entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SortDefinition {
    pub table_id: String,
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortDefinition {
    pub fn new(table_id: impl Into<String>, column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            table_id: table_id.into(),
            column: column.into(),
            direction,
        }
    }

    pub fn column_ref(&self) -> ColumnRef<'_> {
        ColumnRef {
            table_id: &self.table_id,
            column: &self.column,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// A GROUP BY entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupByDefinition {
    pub table_id: String,
    pub column: String,
}

impl GroupByDefinition {
    pub fn new(table_id: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            column: column.into(),
        }
    }

    pub fn column_ref(&self) -> ColumnRef<'_> {
        ColumnRef {
            table_id: &self.table_id,
            column: &self.column,
        }
    }
}
