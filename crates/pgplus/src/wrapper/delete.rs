//! DELETE wrapper.

use super::Apply;
use super::clause::Conditions;
use super::conditional::Conditional;
use super::join::{Join, Joinable};
use crate::error::{MutationKind, OrmResult};
use crate::scope::Scope;
use std::marker::PhantomData;

/// DELETE wrapper for entity `T`.
///
/// For entities with a soft-delete marker the delete sets the marker instead
/// of removing rows, unless `use_soft_delete(false)` is given.
pub struct DeleteWrapper<T> {
    conditions: Conditions,
    joins: Vec<Join>,
    table: Option<String>,
    use_soft_delete: bool,
    allow_global: bool,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Default for DeleteWrapper<T> {
    fn default() -> Self {
        Self {
            conditions: Conditions::new(),
            joins: Vec::new(),
            table: None,
            use_soft_delete: true,
            allow_global: false,
            _entity: PhantomData,
        }
    }
}

impl<T> DeleteWrapper<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// `false` removes rows even when the entity declares a marker column.
    pub fn use_soft_delete(mut self, enabled: bool) -> Self {
        self.use_soft_delete = enabled;
        self
    }

    pub fn table(mut self, name: &str) -> Self {
        self.table = Some(name.to_string());
        self
    }

    /// Allow this delete to run without any condition.
    pub fn allow_global(mut self, allowed: bool) -> Self {
        self.allow_global = allowed;
        self
    }
}

impl<T> Conditional for DeleteWrapper<T> {
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

impl<T> Joinable for DeleteWrapper<T> {
    fn joins_mut(&mut self) -> &mut Vec<Join> {
        &mut self.joins
    }
}

impl<T> Apply for DeleteWrapper<T> {
    fn apply(&self, mut scope: Scope) -> OrmResult<Scope> {
        if let Some(table) = &self.table {
            scope = scope.table(table.as_str());
        }
        for join in &self.joins {
            let (sql, params) = join.to_fragment();
            scope = scope.join(sql, params);
        }
        if !self.conditions.is_empty() {
            let (sql, params) = self.conditions.render();
            scope = scope.filter(sql, params);
        }
        scope = scope.soft_delete(self.use_soft_delete);
        if self.allow_global {
            scope = scope.allow_global(true);
        }
        scope.ensure_scoped(MutationKind::Delete)?;
        Ok(scope)
    }
}
