//! Read wrapper: conditions plus projection, joins, grouping and ordering.

use super::Apply;
use super::clause::Conditions;
use super::conditional::Conditional;
use super::join::{Join, Joinable};
use crate::error::OrmResult;
use crate::scope::Scope;
use crate::value::Value;
use std::marker::PhantomData;

/// SELECT wrapper for entity `T`.
///
/// # Example
/// ```ignore
/// let q = QueryWrapper::<User>::new()
///     .select(["id", "name"])
///     .eq("status", "active")
///     .or()
///     .gt("score", 90)
///     .order_by_desc("created_at")
///     .limit(20);
/// let users = service.list(&client, &q).await?;
/// ```
pub struct QueryWrapper<T> {
    conditions: Conditions,
    columns: Vec<String>,
    distinct: bool,
    joins: Vec<Join>,
    groups: Vec<String>,
    havings: Vec<(String, Vec<Value>)>,
    orders: Vec<String>,
    table: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    unscoped: bool,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Default for QueryWrapper<T> {
    fn default() -> Self {
        Self {
            conditions: Conditions::new(),
            columns: Vec::new(),
            distinct: false,
            joins: Vec::new(),
            groups: Vec::new(),
            havings: Vec::new(),
            orders: Vec::new(),
            table: None,
            limit: None,
            offset: None,
            unscoped: false,
            _entity: PhantomData,
        }
    }
}

impl<T> QueryWrapper<T> {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== projection ====================

    /// Add columns to the projection. Without any, `*` is selected.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Select DISTINCT rows.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ==================== ordering / grouping ====================

    pub fn order_by_asc(mut self, column: &str) -> Self {
        self.orders.push(format!("{} ASC", column));
        self
    }

    pub fn order_by_desc(mut self, column: &str) -> Self {
        self.orders.push(format!("{} DESC", column));
        self
    }

    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Add a HAVING condition with `?` placeholders. Multiple calls are ANDed.
    pub fn having(mut self, fragment: &str, params: Vec<Value>) -> Self {
        self.havings.push((fragment.to_string(), params));
        self
    }

    // ==================== source / paging ====================

    /// Read from `name` instead of the entity's table, e.g. `users u`.
    pub fn table(mut self, name: &str) -> Self {
        self.table = Some(name.to_string());
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Include soft-deleted rows.
    pub fn unscoped(mut self) -> Self {
        self.unscoped = true;
        self
    }
}

impl<T> Conditional for QueryWrapper<T> {
    fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut Conditions {
        &mut self.conditions
    }

    fn nested(&self) -> Self {
        Self::new()
    }
}

impl<T> Joinable for QueryWrapper<T> {
    fn joins_mut(&mut self) -> &mut Vec<Join> {
        &mut self.joins
    }
}

impl<T> Apply for QueryWrapper<T> {
    fn apply(&self, mut scope: Scope) -> OrmResult<Scope> {
        if let Some(table) = &self.table {
            scope = scope.table(table.as_str());
        }
        if !self.columns.is_empty() {
            scope = scope.select(self.columns.iter().cloned());
        }
        if self.distinct {
            scope = scope.distinct();
        }
        for join in &self.joins {
            let (sql, params) = join.to_fragment();
            scope = scope.join(sql, params);
        }
        if !self.conditions.is_empty() {
            let (sql, params) = self.conditions.render();
            scope = scope.filter(sql, params);
        }
        for group in &self.groups {
            scope = scope.group(group.as_str());
        }
        for (fragment, params) in &self.havings {
            scope = scope.having(fragment.as_str(), params.clone());
        }
        for order in &self.orders {
            scope = scope.order(order.as_str());
        }
        if let Some(limit) = self.limit {
            scope = scope.limit(limit);
        }
        if let Some(offset) = self.offset {
            scope = scope.offset(offset);
        }
        if self.unscoped {
            scope = scope.unscoped();
        }
        Ok(scope)
    }
}
