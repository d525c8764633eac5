//! Query Construction Rules
//!
//! Pure functions that keep a `QueryDefinition` valid while a user edits it:
//!
//! ```text
//! (QueryDefinition, DatabaseSchema, QueryAction) → QueryDefinition
//! ```
//!
//! An action that would produce an invalid definition (an aggregation the
//! column's type does not support, a duplicate sort column, an index out of
//! range, ...) is declined: `apply` hands back an unchanged copy. Declining is
//! policy, not an error, and is only logged at debug level.
//!
//! The remaining helpers compute what the editor offers next: tables that can
//! still be added, related tables reachable over one foreign key, aggregation
//! choices per column and sort/group column choices with duplicates marked.

use std::collections::HashSet;

use crate::query::definition::*;
use crate::schema::{ColumnCategory, DatabaseSchema, Relationship, SchemaTable};

/// Most related-table suggestions offered at once
pub const MAX_RELATED_SUGGESTIONS: usize = 3;

/// A single user edit
#[derive(Debug, Clone, PartialEq)]
pub enum QueryAction {
    AddTable { name: String },
    RemoveTable { table_id: String },
    AddJoin(JoinDefinition),
    RemoveJoin { index: usize },
    AddColumn { table_id: String, column: String },
    SetColumn { index: usize, column: String },
    RemoveColumn { index: usize },
    MoveColumn { from: usize, to: usize },
    SetAggregation { index: usize, aggregation: AggregationType },
    SetDateTrunc { index: usize, interval: Option<DateTruncInterval> },
    SetAlias { index: usize, alias: Option<String> },
    AddFilter(FilterDefinition),
    UpdateFilter { index: usize, filter: FilterDefinition },
    RemoveFilter { index: usize },
    AddSort(SortDefinition),
    UpdateSort { index: usize, sort: SortDefinition },
    RemoveSort { index: usize },
    AddGroupBy(GroupByDefinition),
    RemoveGroupBy { index: usize },
    SetLimit(Option<u32>),
    SetOffset(Option<u32>),
}

/// Apply an edit, returning the new definition
///
/// Declined edits return a copy of `def` unchanged.
pub fn apply(def: &QueryDefinition, schema: &DatabaseSchema, action: QueryAction) -> QueryDefinition {
    let label = format!("{:?}", action);
    match try_apply(def, schema, action) {
        Some(next) => next,
        None => {
            tracing::debug!(action = %label, "Declined query edit");
            def.clone()
        }
    }
}

fn try_apply(
    def: &QueryDefinition,
    schema: &DatabaseSchema,
    action: QueryAction,
) -> Option<QueryDefinition> {
    let mut next = def.clone();

    match action {
        QueryAction::AddTable { name } => {
            if schema.table(&name).is_none() || def.has_table_named(&name) {
                return None;
            }
            next.tables.push(QueryTable::new(next_table_id(def), name));
        }

        QueryAction::RemoveTable { table_id } => {
            if !def.has_table_id(&table_id) {
                return None;
            }
            next.tables.retain(|t| t.id != table_id);
            next.columns.retain(|c| c.table_id != table_id);
            next.filters.retain(|f| f.table_id != table_id);
            next.order_by.retain(|s| s.table_id != table_id);
            next.group_by.retain(|g| g.table_id != table_id);
            next.joins
                .retain(|j| j.from_table_id != table_id && j.to_table_id != table_id);
        }

        QueryAction::AddJoin(join) => {
            if !def.has_table_id(&join.from_table_id)
                || !def.has_table_id(&join.to_table_id)
                || def.joins.contains(&join)
            {
                return None;
            }
            next.joins.push(join);
        }

        QueryAction::RemoveJoin { index } => {
            check_index(index, def.joins.len())?;
            next.joins.remove(index);
        }

        QueryAction::AddColumn { table_id, column } => {
            if !def.has_table_id(&table_id) {
                return None;
            }
            next.columns.push(ColumnSelection::new(table_id, column));
        }

        QueryAction::SetColumn { index, column } => {
            let selection = next.columns.get_mut(index)?;
            selection.column = column;

            let category = column_category(def, schema, &selection.table_id, &selection.column);
            if !category.allows(selection.aggregation) {
                selection.aggregation = AggregationType::None;
            }
            if !category.is_date_truncatable() {
                selection.date_trunc = None;
            }
        }

        QueryAction::RemoveColumn { index } => {
            check_index(index, def.columns.len())?;
            next.columns.remove(index);
        }

        QueryAction::MoveColumn { from, to } => {
            next.columns = move_item(&def.columns, from, to)?;
        }

        QueryAction::SetAggregation { index, aggregation } => {
            let options = aggregation_options(def, schema, index)?;
            if !options.contains(&aggregation) {
                return None;
            }
            next.columns[index].aggregation = aggregation;
        }

        QueryAction::SetDateTrunc { index, interval } => {
            let selection = def.columns.get(index)?;
            if interval.is_some()
                && !column_category(def, schema, &selection.table_id, &selection.column)
                    .is_date_truncatable()
            {
                return None;
            }
            next.columns[index].date_trunc = interval;
        }

        QueryAction::SetAlias { index, alias } => {
            let selection = next.columns.get_mut(index)?;
            selection.alias = alias.filter(|a| !a.trim().is_empty());
        }

        QueryAction::AddFilter(filter) => {
            if !def.has_table_id(&filter.table_id) {
                return None;
            }
            next.filters.push(filter);
        }

        QueryAction::UpdateFilter { index, filter } => {
            check_index(index, def.filters.len())?;
            if !def.has_table_id(&filter.table_id) {
                return None;
            }
            next.filters[index] = filter;
        }

        QueryAction::RemoveFilter { index } => {
            check_index(index, def.filters.len())?;
            next.filters.remove(index);
        }

        QueryAction::AddSort(sort) => {
            if !def.has_table_id(&sort.table_id) || sort_in_use(def, &sort, None) {
                return None;
            }
            next.order_by.push(sort);
        }

        QueryAction::UpdateSort { index, sort } => {
            check_index(index, def.order_by.len())?;
            if !def.has_table_id(&sort.table_id) || sort_in_use(def, &sort, Some(index)) {
                return None;
            }
            next.order_by[index] = sort;
        }

        QueryAction::RemoveSort { index } => {
            check_index(index, def.order_by.len())?;
            next.order_by.remove(index);
        }

        QueryAction::AddGroupBy(group) => {
            let taken = def
                .group_by
                .iter()
                .any(|g| g.column_ref() == group.column_ref());
            if !def.has_table_id(&group.table_id) || taken {
                return None;
            }
            next.group_by.push(group);
        }

        QueryAction::RemoveGroupBy { index } => {
            check_index(index, def.group_by.len())?;
            next.group_by.remove(index);
        }

        QueryAction::SetLimit(limit) => next.limit = limit,

        QueryAction::SetOffset(offset) => next.offset = offset,
    }

    Some(next)
}

fn check_index(index: usize, len: usize) -> Option<()> {
    (index < len).then_some(())
}

fn sort_in_use(def: &QueryDefinition, sort: &SortDefinition, editing: Option<usize>) -> bool {
    def.order_by
        .iter()
        .enumerate()
        .any(|(i, s)| Some(i) != editing && s.column_ref() == sort.column_ref())
}

/// Move one element, preserving every other element and the length
fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Option<Vec<T>> {
    if from >= items.len() || to >= items.len() {
        return None;
    }

    let mut moved = items.to_vec();
    let item = moved.remove(from);
    moved.insert(to, item);
    Some(moved)
}

/// Schema tables not yet part of the query, in schema order
pub fn available_tables<'a>(schema: &'a DatabaseSchema, def: &QueryDefinition) -> Vec<&'a SchemaTable> {
    schema
        .tables
        .iter()
        .filter(|t| !def.has_table_named(&t.name))
        .collect()
}

/// Next free local table id (`t1`, `t2`, ...)
///
/// One past the highest existing `tN`. Ids left in gaps are not filled, but
/// removing the highest table frees its id for the next add.
pub fn next_table_id(def: &QueryDefinition) -> String {
    let highest = def
        .tables
        .iter()
        .filter_map(|t| t.id.strip_prefix('t'))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    format!("t{}", highest + 1)
}

/// A table reachable over one foreign key from the current query
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedTable {
    /// Name of the table to add
    pub table: String,
    /// The relationship that connects it
    pub relationship: Relationship,
}

impl RelatedTable {
    /// Join definition connecting the already-present endpoint to `new_table_id`
    ///
    /// Returns `None` when the present endpoint is no longer in the query.
    pub fn join_from(&self, def: &QueryDefinition, new_table_id: &str) -> Option<JoinDefinition> {
        let rel = &self.relationship;
        let (present_table, present_column, new_column) = if rel.to_table == self.table {
            (&rel.from_table, &rel.from_column, &rel.to_column)
        } else {
            (&rel.to_table, &rel.to_column, &rel.from_column)
        };

        let present = def.tables.iter().find(|t| &t.name == present_table)?;

        Some(JoinDefinition {
            from_table_id: present.id.clone(),
            from_column: present_column.clone(),
            to_table_id: new_table_id.to_string(),
            to_column: new_column.clone(),
            join_type: JoinType::Left,
        })
    }
}

/// Tables one relationship away from the query
///
/// A relationship qualifies when exactly one endpoint is already in the
/// query. Targets are deduplicated, kept in relationship order and capped at
/// [`MAX_RELATED_SUGGESTIONS`].
pub fn suggest_related_tables(schema: &DatabaseSchema, def: &QueryDefinition) -> Vec<RelatedTable> {
    let present: HashSet<&str> = def.tables.iter().map(|t| t.name.as_str()).collect();
    let mut suggestions: Vec<RelatedTable> = Vec::new();

    for rel in &schema.relationships {
        if suggestions.len() >= MAX_RELATED_SUGGESTIONS {
            break;
        }

        let from_in = present.contains(rel.from_table.as_str());
        let to_in = present.contains(rel.to_table.as_str());
        let target = match (from_in, to_in) {
            (true, false) => &rel.to_table,
            (false, true) => &rel.from_table,
            _ => continue,
        };

        if suggestions.iter().any(|s| &s.table == target) {
            continue;
        }

        suggestions.push(RelatedTable {
            table: target.clone(),
            relationship: rel.clone(),
        });
    }

    suggestions
}

/// Classification of a `(table id, column)` reference
///
/// Anything that cannot be resolved against the schema is `Unknown`.
pub fn column_category(
    def: &QueryDefinition,
    schema: &DatabaseSchema,
    table_id: &str,
    column: &str,
) -> ColumnCategory {
    def.table(table_id)
        .and_then(|t| schema.column(&t.name, column))
        .map(|c| c.category())
        .unwrap_or(ColumnCategory::Unknown)
}

/// Aggregations offered for the selection at `index`
pub fn aggregation_options(
    def: &QueryDefinition,
    schema: &DatabaseSchema,
    index: usize,
) -> Option<&'static [AggregationType]> {
    let selection = def.columns.get(index)?;
    Some(column_category(def, schema, &selection.table_id, &selection.column).legal_aggregations())
}

/// A column choice in a sort or group-by picker
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnOption {
    pub table_id: String,
    pub table_name: String,
    pub column: String,
    pub category: ColumnCategory,
    /// False when another entry already uses this column
    pub selectable: bool,
}

/// Column choices for the sort entry at `editing` (or a new entry when `None`)
///
/// Columns used by other sort entries stay visible but are not selectable;
/// the edited entry keeps its own current column.
pub fn sort_column_options(
    schema: &DatabaseSchema,
    def: &QueryDefinition,
    editing: Option<usize>,
) -> Vec<ColumnOption> {
    let used: Vec<ColumnRef<'_>> = def
        .order_by
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != editing)
        .map(|(_, s)| s.column_ref())
        .collect();

    column_options(schema, def, &used)
}

/// Column choices for the group-by entry at `editing`, with the same
/// duplicate rule as [`sort_column_options`]
pub fn group_by_column_options(
    schema: &DatabaseSchema,
    def: &QueryDefinition,
    editing: Option<usize>,
) -> Vec<ColumnOption> {
    let used: Vec<ColumnRef<'_>> = def
        .group_by
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != editing)
        .map(|(_, g)| g.column_ref())
        .collect();

    column_options(schema, def, &used)
}

fn column_options(
    schema: &DatabaseSchema,
    def: &QueryDefinition,
    used: &[ColumnRef<'_>],
) -> Vec<ColumnOption> {
    def.tables
        .iter()
        .filter_map(|qt| schema.table(&qt.name).map(|st| (qt, st)))
        .flat_map(move |(qt, st)| {
            st.columns.iter().map(move |c| ColumnOption {
                table_id: qt.id.clone(),
                table_name: qt.name.clone(),
                column: c.name.clone(),
                category: c.category(),
                selectable: !used.iter().any(|u| u.table_id == qt.id && u.column == c.name),
            })
        })
        .collect()
}

/// The definition to send to the backend, or `None` while it is incomplete
///
/// Untouched placeholder selections are dropped. Anything else that is
/// missing a required field (an aggregation with no column, a filter without
/// a value of the right shape, a reference to a table id not in the query)
/// keeps the whole definition back.
pub fn executable(def: &QueryDefinition) -> Option<QueryDefinition> {
    if def.tables.is_empty() {
        return None;
    }

    let mut ready = def.clone();
    ready.columns.retain(|c| !c.is_placeholder());

    if ready.columns.is_empty() || !ready.columns.iter().all(ColumnSelection::is_complete) {
        return None;
    }

    let known = |id: &str| def.has_table_id(id);

    let refs_ok = ready.columns.iter().all(|c| known(&c.table_id))
        && ready.filters.iter().all(|f| known(&f.table_id))
        && ready.order_by.iter().all(|s| known(&s.table_id))
        && ready.group_by.iter().all(|g| known(&g.table_id))
        && ready
            .joins
            .iter()
            .all(|j| known(&j.from_table_id) && known(&j.to_table_id));

    if !refs_ok
        || !ready.filters.iter().all(FilterDefinition::is_complete)
        || !ready.joins.iter().all(JoinDefinition::is_complete)
    {
        return None;
    }

    Some(ready)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnSchema;

    fn schema() -> DatabaseSchema {
        DatabaseSchema::new(
            vec![
                SchemaTable::new("orders", "public")
                    .column_def(ColumnSchema::new("id", "integer").primary_key())
                    .column_def(ColumnSchema::new("customer_id", "integer"))
                    .column_def(ColumnSchema::new("product_id", "integer"))
                    .column_def(ColumnSchema::new("amount", "numeric(12,2)"))
                    .column_def(ColumnSchema::new("status", "character varying"))
                    .column_def(ColumnSchema::new("created_at", "timestamp")),
                SchemaTable::new("customers", "public")
                    .column_def(ColumnSchema::new("id", "integer").primary_key())
                    .column_def(ColumnSchema::new("region_id", "integer"))
                    .column_def(ColumnSchema::new("name", "text")),
                SchemaTable::new("products", "public")
                    .column_def(ColumnSchema::new("id", "integer").primary_key())
                    .column_def(ColumnSchema::new("title", "text")),
                SchemaTable::new("regions", "public")
                    .column_def(ColumnSchema::new("id", "integer").primary_key())
                    .column_def(ColumnSchema::new("label", "text")),
                SchemaTable::new("refunds", "public")
                    .column_def(ColumnSchema::new("order_id", "integer")),
                SchemaTable::new("shipments", "public")
                    .column_def(ColumnSchema::new("order_id", "integer")),
            ],
            vec![
                Relationship::new("orders", "customer_id", "customers", "id"),
                Relationship::new("orders", "product_id", "products", "id"),
                Relationship::new("customers", "region_id", "regions", "id"),
                Relationship::new("refunds", "order_id", "orders", "id"),
                Relationship::new("shipments", "order_id", "orders", "id"),
                Relationship::new("orders", "customer_id", "customers", "id"),
            ],
        )
    }

    fn with_orders() -> QueryDefinition {
        apply(
            &QueryDefinition::new(),
            &schema(),
            QueryAction::AddTable {
                name: "orders".into(),
            },
        )
    }

    fn with_columns() -> QueryDefinition {
        let schema = schema();
        let mut def = with_orders();
        for column in ["status", "amount", "created_at"] {
            def = apply(
                &def,
                &schema,
                QueryAction::AddColumn {
                    table_id: "t1".into(),
                    column: column.into(),
                },
            );
        }
        def
    }

    #[test]
    fn test_add_table_assigns_ids() {
        let schema = schema();
        let def = with_orders();
        assert_eq!(def.tables, vec![QueryTable::new("t1", "orders")]);

        let def = apply(&def, &schema, QueryAction::AddTable { name: "customers".into() });
        assert_eq!(def.tables[1].id, "t2");

        // Duplicate and unknown tables are declined
        let same = apply(&def, &schema, QueryAction::AddTable { name: "orders".into() });
        assert_eq!(same, def);
        let same = apply(&def, &schema, QueryAction::AddTable { name: "nope".into() });
        assert_eq!(same, def);
    }

    #[test]
    fn test_next_table_id_skips_gaps() {
        let def = QueryDefinition {
            tables: vec![QueryTable::new("t1", "orders"), QueryTable::new("t3", "products")],
            ..Default::default()
        };
        assert_eq!(next_table_id(&def), "t4");
        assert_eq!(next_table_id(&QueryDefinition::new()), "t1");

        let odd = QueryDefinition {
            tables: vec![QueryTable::new("custom", "orders"), QueryTable::new("t2", "x")],
            ..Default::default()
        };
        assert_eq!(next_table_id(&odd), "t3");
    }

    #[test]
    fn test_available_tables() {
        let schema = schema();
        let def = with_orders();
        let names: Vec<&str> = available_tables(&schema, &def)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["customers", "products", "regions", "refunds", "shipments"]);
    }

    #[test]
    fn test_related_tables_one_hop_capped() {
        let schema = schema();
        let def = with_orders();

        let related = suggest_related_tables(&schema, &def);
        let names: Vec<&str> = related.iter().map(|r| r.table.as_str()).collect();
        assert_eq!(names, vec!["customers", "products", "refunds"]);
        assert!(!names.contains(&"regions"));
        assert!(!names.contains(&"orders"));
    }

    #[test]
    fn test_related_tables_never_present() {
        let schema = schema();
        let mut def = with_orders();
        for name in ["customers", "products"] {
            def = apply(&def, &schema, QueryAction::AddTable { name: name.into() });
        }

        let related = suggest_related_tables(&schema, &def);
        let names: Vec<&str> = related.iter().map(|r| r.table.as_str()).collect();
        assert_eq!(names, vec!["regions", "refunds", "shipments"]);
        assert!(related.len() <= MAX_RELATED_SUGGESTIONS);
        for r in &related {
            assert!(!def.has_table_named(&r.table));
        }
    }

    #[test]
    fn test_related_table_join_prefill() {
        let schema = schema();
        let def = with_orders();
        let related = suggest_related_tables(&schema, &def);

        // orders.customer_id -> customers.id
        let join = related[0].join_from(&def, "t2").unwrap();
        assert_eq!(join.from_table_id, "t1");
        assert_eq!(join.from_column, "customer_id");
        assert_eq!(join.to_table_id, "t2");
        assert_eq!(join.to_column, "id");

        // refunds.order_id -> orders.id, seen from orders
        let join = related[2].join_from(&def, "t2").unwrap();
        assert_eq!(join.from_column, "id");
        assert_eq!(join.to_column, "order_id");

        // Suggestions are never auto-applied
        assert!(def.joins.is_empty());
    }

    #[test]
    fn test_remove_table_cascades() {
        let schema = schema();
        let mut def = with_columns();
        def = apply(&def, &schema, QueryAction::AddTable { name: "customers".into() });
        def = apply(
            &def,
            &schema,
            QueryAction::AddColumn {
                table_id: "t2".into(),
                column: "name".into(),
            },
        );
        def = apply(
            &def,
            &schema,
            QueryAction::AddJoin(JoinDefinition {
                from_table_id: "t1".into(),
                from_column: "customer_id".into(),
                to_table_id: "t2".into(),
                to_column: "id".into(),
                join_type: JoinType::Inner,
            }),
        );
        def = apply(&def, &schema, QueryAction::AddSort(SortDefinition::new("t2", "name", SortDirection::Asc)));
        assert_eq!(def.joins.len(), 1);

        let def = apply(&def, &schema, QueryAction::RemoveTable { table_id: "t2".into() });
        assert_eq!(def.tables.len(), 1);
        assert_eq!(def.columns.len(), 3);
        assert!(def.joins.is_empty());
        assert!(def.order_by.is_empty());

        let def = apply(&def, &schema, QueryAction::AddTable { name: "products".into() });
        assert_eq!(def.tables[1].id, "t2");
    }

    #[test]
    fn test_edits_do_not_mutate_input() {
        let schema = schema();
        let before = with_columns();
        let snapshot = before.clone();
        let _after = apply(&before, &schema, QueryAction::RemoveColumn { index: 0 });
        assert_eq!(before, snapshot);
    }

    #[test]
    fn test_move_column_preserves_cardinality() {
        let schema = schema();
        let def = with_columns();

        for from in 0..3 {
            for to in 0..3 {
                let moved = apply(&def, &schema, QueryAction::MoveColumn { from, to });
                assert_eq!(moved.columns.len(), 3);

                let mut names: Vec<&str> = moved.columns.iter().map(|c| c.column.as_str()).collect();
                names.sort();
                assert_eq!(names, vec!["amount", "created_at", "status"]);
                assert_eq!(moved.columns[to], def.columns[from]);
            }
        }

        let moved = apply(&def, &schema, QueryAction::MoveColumn { from: 0, to: 2 });
        let names: Vec<&str> = moved.columns.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(names, vec!["amount", "created_at", "status"]);

        let same = apply(&def, &schema, QueryAction::MoveColumn { from: 0, to: 7 });
        assert_eq!(same, def);
    }

    #[test]
    fn test_aggregation_is_type_checked() {
        let schema = schema();
        let def = with_columns();

        assert_eq!(aggregation_options(&def, &schema, 1).unwrap().len(), 7);
        assert_eq!(aggregation_options(&def, &schema, 0).unwrap().len(), 3);
        assert!(aggregation_options(&def, &schema, 9).is_none());

        let summed = apply(
            &def,
            &schema,
            QueryAction::SetAggregation {
                index: 1,
                aggregation: AggregationType::Sum,
            },
        );
        assert_eq!(summed.columns[1].aggregation, AggregationType::Sum);

        // SUM over text is declined
        let same = apply(
            &def,
            &schema,
            QueryAction::SetAggregation {
                index: 0,
                aggregation: AggregationType::Sum,
            },
        );
        assert_eq!(same, def);
    }

    #[test]
    fn test_date_trunc_only_on_dates() {
        let schema = schema();
        let def = with_columns();

        let truncated = apply(
            &def,
            &schema,
            QueryAction::SetDateTrunc {
                index: 2,
                interval: Some(DateTruncInterval::Month),
            },
        );
        assert_eq!(truncated.columns[2].date_trunc, Some(DateTruncInterval::Month));

        for index in [0, 1] {
            let same = apply(
                &def,
                &schema,
                QueryAction::SetDateTrunc {
                    index,
                    interval: Some(DateTruncInterval::Day),
                },
            );
            assert_eq!(same, def);
        }

        let cleared = apply(&truncated, &schema, QueryAction::SetDateTrunc { index: 2, interval: None });
        assert_eq!(cleared.columns[2].date_trunc, None);
    }

    #[test]
    fn test_set_column_resets_illegal_settings() {
        let schema = schema();
        let mut def = with_columns();
        def = apply(
            &def,
            &schema,
            QueryAction::SetAggregation {
                index: 1,
                aggregation: AggregationType::Avg,
            },
        );
        def = apply(
            &def,
            &schema,
            QueryAction::SetDateTrunc {
                index: 2,
                interval: Some(DateTruncInterval::Week),
            },
        );

        let def = apply(&def, &schema, QueryAction::SetColumn { index: 1, column: "status".into() });
        assert_eq!(def.columns[1].aggregation, AggregationType::None);

        let def = apply(&def, &schema, QueryAction::SetColumn { index: 2, column: "id".into() });
        assert_eq!(def.columns[2].date_trunc, None);
    }

    #[test]
    fn test_sort_duplicates_declined() {
        let schema = schema();
        let mut def = with_columns();
        def = apply(&def, &schema, QueryAction::AddSort(SortDefinition::new("t1", "amount", SortDirection::Desc)));
        def = apply(&def, &schema, QueryAction::AddSort(SortDefinition::new("t1", "status", SortDirection::Asc)));
        assert_eq!(def.order_by.len(), 2);

        let same = apply(&def, &schema, QueryAction::AddSort(SortDefinition::new("t1", "amount", SortDirection::Asc)));
        assert_eq!(same, def);

        // Editing an entry may keep its own column
        let flipped = apply(
            &def,
            &schema,
            QueryAction::UpdateSort {
                index: 0,
                sort: SortDefinition::new("t1", "amount", SortDirection::Asc),
            },
        );
        assert_eq!(flipped.order_by[0].direction, SortDirection::Asc);

        // ...but not take another entry's column
        let same = apply(
            &def,
            &schema,
            QueryAction::UpdateSort {
                index: 0,
                sort: SortDefinition::new("t1", "status", SortDirection::Asc),
            },
        );
        assert_eq!(same, def);
    }

    #[test]
    fn test_sort_column_options_mark_used() {
        let schema = schema();
        let mut def = with_columns();
        def = apply(&def, &schema, QueryAction::AddSort(SortDefinition::new("t1", "amount", SortDirection::Desc)));
        def = apply(&def, &schema, QueryAction::AddSort(SortDefinition::new("t1", "status", SortDirection::Asc)));

        let options = sort_column_options(&schema, &def, None);
        assert_eq!(options.len(), 6);
        let amount = options.iter().find(|o| o.column == "amount").unwrap();
        assert!(!amount.selectable);
        assert_eq!(amount.category, ColumnCategory::Numeric);
        assert!(options.iter().find(|o| o.column == "id").unwrap().selectable);

        let editing_first = sort_column_options(&schema, &def, Some(0));
        assert!(editing_first.iter().find(|o| o.column == "amount").unwrap().selectable);
        assert!(!editing_first.iter().find(|o| o.column == "status").unwrap().selectable);
    }

    #[test]
    fn test_group_by_options_and_duplicates() {
        let schema = schema();
        let mut def = with_columns();
        def = apply(&def, &schema, QueryAction::AddGroupBy(GroupByDefinition::new("t1", "status")));
        let same = apply(&def, &schema, QueryAction::AddGroupBy(GroupByDefinition::new("t1", "status")));
        assert_eq!(same, def);

        let options = group_by_column_options(&schema, &def, None);
        assert!(!options.iter().find(|o| o.column == "status").unwrap().selectable);

        let def = apply(&def, &schema, QueryAction::RemoveGroupBy { index: 0 });
        assert!(def.group_by.is_empty());
    }

    #[test]
    fn test_executable_gating() {
        let schema = schema();
        assert!(executable(&QueryDefinition::new()).is_none());

        let def = with_orders();
        assert!(executable(&def).is_none(), "no columns yet");

        let def = with_columns();
        let ready = executable(&def).unwrap();
        assert_eq!(ready, def);

        // A placeholder row is dropped, not sent
        let with_placeholder = apply(
            &def,
            &schema,
            QueryAction::AddColumn {
                table_id: "t1".into(),
                column: String::new(),
            },
        );
        assert_eq!(executable(&with_placeholder).unwrap().columns.len(), 3);

        // An aggregation with no column holds the query back
        let mut draft = with_placeholder.clone();
        draft.columns[3].aggregation = AggregationType::Count;
        assert!(executable(&draft).is_none());

        // So does an incomplete filter
        let filtered = apply(
            &def,
            &schema,
            QueryAction::AddFilter(FilterDefinition::new("t1", "amount", FilterOperator::Gt)),
        );
        assert_eq!(filtered.filters.len(), 1);
        assert!(executable(&filtered).is_none());

        let fixed = apply(
            &filtered,
            &schema,
            QueryAction::UpdateFilter {
                index: 0,
                filter: FilterDefinition::new("t1", "amount", FilterOperator::Gt).scalar(100.0_f64),
            },
        );
        assert!(executable(&fixed).is_some());

        let cleared = apply(&fixed, &schema, QueryAction::RemoveFilter { index: 0 });
        assert!(cleared.filters.is_empty());
    }

    #[test]
    fn test_limit_offset_alias() {
        let schema = schema();
        let def = with_columns();
        let def = apply(&def, &schema, QueryAction::SetLimit(Some(50)));
        let def = apply(&def, &schema, QueryAction::SetOffset(Some(100)));
        assert_eq!((def.limit, def.offset), (Some(50), Some(100)));

        let def = apply(&def, &schema, QueryAction::SetAlias { index: 1, alias: Some("Total".into()) });
        assert_eq!(def.columns[1].display_name(), "Total");
        let def = apply(&def, &schema, QueryAction::SetAlias { index: 1, alias: Some("  ".into()) });
        assert_eq!(def.columns[1].alias, None);
    }
}
