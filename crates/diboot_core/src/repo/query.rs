//! Small filter/order model for generic list queries.
//!
//! # Invariants
//! - Column names are resolved against the entity mapping before any SQL is
//!   built; unknown names fail with `RepoError::UnknownColumn`.
//! - All values are bound as parameters.

use crate::model::entity::EntityId;
use crate::repo::error::RepoResult;
use crate::repo::table::{resolve_column, TableEntity};
use crate::vo::pagination::OrderItem;
use rusqlite::types::Value;

/// Scalar filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Integer(i64),
    Text(String),
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<FilterValue> for Value {
    fn from(value: FilterValue) -> Self {
        match value {
            FilterValue::Integer(value) => Value::Integer(value),
            FilterValue::Text(value) => Value::Text(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Eq(String, FilterValue),
    Ne(String, FilterValue),
    In(String, Vec<FilterValue>),
}

/// Conjunctive filter plus ordering for list queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityQuery {
    pub conditions: Vec<Condition>,
    pub orders: Vec<OrderItem>,
}

impl EntityQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.conditions
            .push(Condition::Eq(column.into(), value.into()));
        self
    }

    pub fn ne(mut self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.conditions
            .push(Condition::Ne(column.into(), value.into()));
        self
    }

    pub fn in_values<V: Into<FilterValue>>(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.conditions.push(Condition::In(
            column.into(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn in_ids(self, ids: &[EntityId]) -> Self {
        self.in_values("id", ids.iter().copied())
    }

    pub fn order_by_asc(mut self, column: impl Into<String>) -> Self {
        self.orders.push(OrderItem::asc(column));
        self
    }

    pub fn order_by_desc(mut self, column: impl Into<String>) -> Self {
        self.orders.push(OrderItem::desc(column));
        self
    }

    /// Renders ` AND ...` predicates for appending after a `WHERE` clause,
    /// pushing bound values in placeholder order.
    pub(crate) fn where_sql<T: TableEntity>(&self, bind_values: &mut Vec<Value>) -> RepoResult<String> {
        let mut sql = String::new();
        for condition in &self.conditions {
            match condition {
                Condition::Eq(column, value) => {
                    let column = resolve_column::<T>(column)?;
                    sql.push_str(&format!(" AND {column} = ?"));
                    bind_values.push(value.clone().into());
                }
                Condition::Ne(column, value) => {
                    let column = resolve_column::<T>(column)?;
                    sql.push_str(&format!(" AND {column} <> ?"));
                    bind_values.push(value.clone().into());
                }
                Condition::In(column, values) => {
                    let column = resolve_column::<T>(column)?;
                    if values.is_empty() {
                        sql.push_str(" AND 1 = 0");
                        continue;
                    }
                    let placeholders = vec!["?"; values.len()].join(", ");
                    sql.push_str(&format!(" AND {column} IN ({placeholders})"));
                    bind_values.extend(values.iter().cloned().map(Value::from));
                }
            }
        }
        Ok(sql)
    }
}

/// Renders ` ORDER BY ...` from the given items, defaulting to `id ASC`.
pub(crate) fn order_sql<T: TableEntity>(orders: &[OrderItem]) -> RepoResult<String> {
    if orders.is_empty() {
        return Ok(" ORDER BY id ASC".to_string());
    }
    let mut parts = Vec::with_capacity(orders.len());
    for item in orders {
        let column = resolve_column::<T>(&item.column)?;
        let direction = if item.asc { "ASC" } else { "DESC" };
        parts.push(format!("{column} {direction}"));
    }
    Ok(format!(" ORDER BY {}", parts.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::{order_sql, EntityQuery};
    use crate::model::dictionary::Dictionary;
    use crate::repo::error::RepoError;
    use crate::vo::pagination::OrderItem;

    #[test]
    fn where_sql_binds_values_in_order() {
        let query = EntityQuery::new()
            .eq("type", "GENDER")
            .ne("parent_id", 0_i64)
            .in_ids(&[1, 2]);
        let mut values = Vec::new();
        let sql = query
            .where_sql::<Dictionary>(&mut values)
            .expect("known columns should render");
        assert_eq!(sql, " AND type = ? AND parent_id <> ? AND id IN (?, ?)");
        assert_eq!(values.len(), 4);
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let mut values = Vec::new();
        let sql = EntityQuery::new()
            .in_ids(&[])
            .where_sql::<Dictionary>(&mut values)
            .expect("empty in-list should render");
        assert_eq!(sql, " AND 1 = 0");
        assert!(values.is_empty());
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let mut values = Vec::new();
        let err = EntityQuery::new()
            .eq("type; DROP TABLE dictionary", "x")
            .where_sql::<Dictionary>(&mut values)
            .expect_err("unknown column must fail");
        assert!(matches!(err, RepoError::UnknownColumn { .. }));

        let err = order_sql::<Dictionary>(&[OrderItem::desc("nope")])
            .expect_err("unknown order column must fail");
        assert!(matches!(err, RepoError::UnknownColumn { .. }));
    }
}
