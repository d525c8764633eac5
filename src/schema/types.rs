//! Schema snapshot types
//!
//! These mirror the JSON returned by the backend's schema endpoint and are
//! consumed read-only by the construction rules.

use serde::{Deserialize, Serialize};

use super::classify::{classify, ColumnCategory};

/// A full schema snapshot: tables plus the foreign-key graph between them
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DatabaseSchema {
    #[serde(default)]
    pub tables: Vec<SchemaTable>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl DatabaseSchema {
    /// Create a schema from tables and relationships
    pub fn new(tables: Vec<SchemaTable>, relationships: Vec<Relationship>) -> Self {
        Self {
            tables,
            relationships,
        }
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Option<&SchemaTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Look up a column of a table by name
    pub fn column(&self, table: &str, column: &str) -> Option<&ColumnSchema> {
        self.table(table).and_then(|t| t.column(column))
    }
}

/// A table as described by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaTable {
    pub name: String,
    #[serde(default)]
    pub schema_name: String,
    #[serde(default)]
    pub columns: Vec<ColumnSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count_estimate: Option<u64>,
}

impl SchemaTable {
    /// Create an empty table in the given schema
    pub fn new(name: impl Into<String>, schema_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_name: schema_name.into(),
            columns: Vec::new(),
            row_count_estimate: None,
        }
    }

    /// Builder method: add a column
    pub fn column_def(mut self, column: ColumnSchema) -> Self {
        self.columns.push(column);
        self
    }

    /// Builder method: set the row count estimate
    pub fn row_count(mut self, estimate: u64) -> Self {
        self.row_count_estimate = Some(estimate);
        self
    }

    /// Find a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Qualified `schema.table` name, or the bare name when no schema is set
    pub fn qualified_name(&self) -> String {
        if self.schema_name.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.schema_name, self.name)
        }
    }
}

/// A column as described by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    pub name: String,
    /// Free-form backend type name, e.g. `character varying` or `timestamp`
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl ColumnSchema {
    /// Create a nullable, non-key column
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            is_primary_key: false,
            default_value: None,
        }
    }

    /// Builder method: mark as primary key (implies not null)
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    /// Builder method: mark as not null
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Classification of this column's data type
    pub fn category(&self) -> ColumnCategory {
        classify(&self.data_type)
    }
}

/// A directed foreign-key edge between two tables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

impl Relationship {
    pub fn new(
        from_table: impl Into<String>,
        from_column: impl Into<String>,
        to_table: impl Into<String>,
        to_column: impl Into<String>,
    ) -> Self {
        Self {
            from_table: from_table.into(),
            from_column: from_column.into(),
            to_table: to_table.into(),
            to_column: to_column.into(),
        }
    }

    /// Whether either endpoint is the given table
    pub fn touches(&self, table: &str) -> bool {
        self.from_table == table || self.to_table == table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_deserializes_backend_shape() {
        let json = r#"{
            "tables": [{
                "name": "orders",
                "schemaName": "public",
                "columns": [
                    {"name": "id", "dataType": "integer", "nullable": false, "isPrimaryKey": true, "defaultValue": null},
                    {"name": "created_at", "dataType": "timestamp without time zone", "nullable": true, "isPrimaryKey": false, "defaultValue": "now()"}
                ],
                "rowCountEstimate": 1200
            }],
            "relationships": [
                {"fromTable": "orders", "fromColumn": "customer_id", "toTable": "customers", "toColumn": "id"}
            ]
        }"#;

        let schema: DatabaseSchema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.tables.len(), 1);
        assert_eq!(schema.tables[0].row_count_estimate, Some(1200));
        assert_eq!(schema.tables[0].qualified_name(), "public.orders");

        let created = schema.column("orders", "created_at").unwrap();
        assert_eq!(created.category(), ColumnCategory::Date);
        assert_eq!(created.default_value.as_deref(), Some("now()"));

        assert!(schema.relationships[0].touches("customers"));
        assert!(!schema.relationships[0].touches("products"));
    }

    #[test]
    fn test_lookup_missing() {
        let schema = DatabaseSchema::default();
        assert!(schema.table("orders").is_none());
        assert!(schema.column("orders", "id").is_none());
    }
}
