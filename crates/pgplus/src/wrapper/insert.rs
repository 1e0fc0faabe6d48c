//! INSERT wrapper.

use super::Apply;
use crate::error::OrmResult;
use crate::scope::Scope;
use crate::value::Value;
use std::marker::PhantomData;

/// Single-row INSERT wrapper for entity `T`. Without any column it inserts
/// `DEFAULT VALUES`.
pub struct InsertWrapper<T> {
    values: Vec<(String, Value)>,
    table: Option<String>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Default for InsertWrapper<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            table: None,
            _entity: PhantomData,
        }
    }
}

impl<T> InsertWrapper<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column. Setting it again replaces the value in place.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.values.iter_mut().find(|(c, _)| c == column) {
            Some(slot) => slot.1 = value,
            None => self.values.push((column.to_string(), value)),
        }
        self
    }

    pub fn set_if(self, column: &str, value: impl Into<Value>, include: bool) -> Self {
        if include { self.set(column, value) } else { self }
    }

    pub fn table(mut self, name: &str) -> Self {
        self.table = Some(name.to_string());
        self
    }

    /// Number of columns set so far.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T> Apply for InsertWrapper<T> {
    fn apply(&self, mut scope: Scope) -> OrmResult<Scope> {
        if let Some(table) = &self.table {
            scope = scope.table(table.as_str());
        }
        Ok(scope.push_row(self.values.clone()))
    }
}
