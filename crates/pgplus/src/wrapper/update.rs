//! UPDATE wrapper.

use super::Apply;
use super::clause::Conditions;
use super::conditional::Conditional;
use super::join::{Join, Joinable};
use crate::error::{MutationKind, OrmResult};
use crate::scope::{Assignment, Scope};
use crate::value::Value;
use std::marker::PhantomData;

/// UPDATE wrapper for entity `T`.
///
/// Assignments keep the order of their first `set`; setting a column again
/// replaces its value in place.
///
/// # Example
/// ```ignore
/// let w = UpdateWrapper::<User>::new()
///     .set("status", "inactive")
///     .set_incr_by("version", 1)
///     .set_raw("updated_at", "NOW()")
///     .eq("id", 42);
/// service.update(&client, &w).await?;
/// ```
pub struct UpdateWrapper<T> {
    conditions: Conditions,
    joins: Vec<Join>,
    assignments: Vec<(String, Assignment)>,
    table: Option<String>,
    allow_global: bool,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Default for UpdateWrapper<T> {
    fn default() -> Self {
        Self {
            conditions: Conditions::new(),
            joins: Vec::new(),
            assignments: Vec::new(),
            table: None,
            allow_global: false,
            _entity: PhantomData,
        }
    }
}

impl<T> UpdateWrapper<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn put(mut self, column: &str, assignment: Assignment) -> Self {
        match self.assignments.iter_mut().find(|(c, _)| c == column) {
            Some(slot) => slot.1 = assignment,
            None => self.assignments.push((column.to_string(), assignment)),
        }
        self
    }

    /// SET column = value
    pub fn set(self, column: &str, value: impl Into<Value>) -> Self {
        self.put(column, Assignment::Value(value.into()))
    }

    pub fn set_if(self, column: &str, value: impl Into<Value>, include: bool) -> Self {
        if include { self.set(column, value) } else { self }
    }

    /// SET column = column + amount
    pub fn set_incr_by(self, column: &str, amount: impl Into<Value>) -> Self {
        self.put(column, Assignment::Incr(amount.into()))
    }

    /// SET column = column - amount
    pub fn set_decr_by(self, column: &str, amount: impl Into<Value>) -> Self {
        self.put(column, Assignment::Decr(amount.into()))
    }

    /// SET column = <raw SQL expression>
    pub fn set_raw(self, column: &str, expr: &str) -> Self {
        self.put(column, Assignment::Raw(expr.to_string()))
    }

    pub fn table(mut self, name: &str) -> Self {
        self.table = Some(name.to_string());
        self
    }

    /// Allow this update to run without any condition.
    pub fn allow_global(mut self, allowed: bool) -> Self {
        self.allow_global = allowed;
        self
    }
}

impl<T> Conditional for UpdateWrapper<T> {
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

impl<T> Joinable for UpdateWrapper<T> {
    fn joins_mut(&mut self) -> &mut Vec<Join> {
        &mut self.joins
    }
}

impl<T> Apply for UpdateWrapper<T> {
    fn apply(&self, mut scope: Scope) -> OrmResult<Scope> {
        if let Some(table) = &self.table {
            scope = scope.table(table.as_str());
        }
        for join in &self.joins {
            let (sql, params) = join.to_fragment();
            scope = scope.join(sql, params);
        }
        for (column, assignment) in &self.assignments {
            scope = scope.assign(column.as_str(), assignment.clone());
        }
        if !self.conditions.is_empty() {
            let (sql, params) = self.conditions.render();
            scope = scope.filter(sql, params);
        }
        if self.allow_global {
            scope = scope.allow_global(true);
        }
        scope.ensure_scoped(MutationKind::Update)?;
        Ok(scope)
    }
}
