//! The comparison grammar shared by every wrapper that has a WHERE or ON list.

use super::clause::Conditions;
use crate::value::Value;
use std::fmt::Display;

/// Condition methods implemented once for every builder owning a [`Conditions`].
///
/// Each operator appends one clause using the pending connector. The `_if`
/// twins take a trailing `include` flag; `false` leaves the builder untouched,
/// pending connector included.
///
/// # Example
/// ```ignore
/// let q = QueryWrapper::<User>::new()
///     .eq("status", "active")
///     .like_if("name", keyword, !keyword.is_empty())
///     .and_nested(|w| w.gt("age", 18).or().is_null("age"));
/// ```
pub trait Conditional: Sized {
    /// The builder's condition list.
    fn conditions(&self) -> &Conditions;

    /// Mutable access to the builder's condition list.
    fn conditions_mut(&mut self) -> &mut Conditions;

    /// A new, empty builder of the same kind for nested groups.
    fn nested(&self) -> Self;

    // ==================== connectors ====================

    /// Attach the next clause with `OR`.
    fn or(mut self) -> Self {
        self.conditions_mut().set_or();
        self
    }

    /// Attach the next clause with `AND` (the default).
    fn and(mut self) -> Self {
        self.conditions_mut().set_and();
        self
    }

    /// Append `(...)` built by `f` on a fresh builder, joined with the
    /// pending connector.
    fn and_nested<F>(self, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        self.group(f)
    }

    /// Append `(...)` built by `f` on a fresh builder.
    ///
    /// Like [`and_nested`](Self::and_nested) the group uses the connector
    /// pending at call time, so write `w.or().or_nested(f)` for an `OR` group.
    fn or_nested<F>(self, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        self.group(f)
    }

    #[doc(hidden)]
    fn group<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        let built = f(self.nested());
        self.conditions_mut().push_group(built.conditions());
        self
    }

    #[doc(hidden)]
    fn push_when(mut self, include: bool, fragment: String, params: Vec<Value>) -> Self {
        if include {
            self.conditions_mut().push(fragment, params);
        }
        self
    }

    // ==================== comparison ====================

    /// `column = value`
    fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.eq_if(column, value, true)
    }

    fn eq_if(self, column: &str, value: impl Into<Value>, include: bool) -> Self {
        self.push_when(include, format!("{} = ?", column), vec![value.into()])
    }

    /// `column <> value`
    fn ne(self, column: &str, value: impl Into<Value>) -> Self {
        self.ne_if(column, value, true)
    }

    fn ne_if(self, column: &str, value: impl Into<Value>, include: bool) -> Self {
        self.push_when(include, format!("{} <> ?", column), vec![value.into()])
    }

    /// `column > value`
    fn gt(self, column: &str, value: impl Into<Value>) -> Self {
        self.gt_if(column, value, true)
    }

    fn gt_if(self, column: &str, value: impl Into<Value>, include: bool) -> Self {
        self.push_when(include, format!("{} > ?", column), vec![value.into()])
    }

    /// `column >= value`
    fn ge(self, column: &str, value: impl Into<Value>) -> Self {
        self.ge_if(column, value, true)
    }

    fn ge_if(self, column: &str, value: impl Into<Value>, include: bool) -> Self {
        self.push_when(include, format!("{} >= ?", column), vec![value.into()])
    }

    /// `column < value`
    fn lt(self, column: &str, value: impl Into<Value>) -> Self {
        self.lt_if(column, value, true)
    }

    fn lt_if(self, column: &str, value: impl Into<Value>, include: bool) -> Self {
        self.push_when(include, format!("{} < ?", column), vec![value.into()])
    }

    /// `column <= value`
    fn le(self, column: &str, value: impl Into<Value>) -> Self {
        self.le_if(column, value, true)
    }

    fn le_if(self, column: &str, value: impl Into<Value>, include: bool) -> Self {
        self.push_when(include, format!("{} <= ?", column), vec![value.into()])
    }

    // ==================== LIKE ====================

    /// `column LIKE '%value%'`
    fn like(self, column: &str, value: impl Display) -> Self {
        self.like_if(column, value, true)
    }

    fn like_if(self, column: &str, value: impl Display, include: bool) -> Self {
        let pattern = format!("%{}%", value);
        self.push_when(include, format!("{} LIKE ?", column), vec![pattern.into()])
    }

    /// `column LIKE '%value'`
    fn like_left(self, column: &str, value: impl Display) -> Self {
        self.like_left_if(column, value, true)
    }

    fn like_left_if(self, column: &str, value: impl Display, include: bool) -> Self {
        let pattern = format!("%{}", value);
        self.push_when(include, format!("{} LIKE ?", column), vec![pattern.into()])
    }

    /// `column LIKE 'value%'`
    fn like_right(self, column: &str, value: impl Display) -> Self {
        self.like_right_if(column, value, true)
    }

    fn like_right_if(self, column: &str, value: impl Display, include: bool) -> Self {
        let pattern = format!("{}%", value);
        self.push_when(include, format!("{} LIKE ?", column), vec![pattern.into()])
    }

    // ==================== sets and ranges ====================

    /// `column IN (values)`. The values are bound as one list parameter.
    fn in_list<I>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.in_list_if(column, values, true)
    }

    fn in_list_if<I>(self, column: &str, values: I, include: bool) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.push_when(include, format!("{} IN (?)", column), vec![Value::list(values)])
    }

    /// `column NOT IN (values)`
    fn not_in<I>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.not_in_if(column, values, true)
    }

    fn not_in_if<I>(self, column: &str, values: I, include: bool) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.push_when(
            include,
            format!("{} NOT IN (?)", column),
            vec![Value::list(values)],
        )
    }

    /// `column BETWEEN low AND high`
    fn between(self, column: &str, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.between_if(column, low, high, true)
    }

    fn between_if(
        self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
        include: bool,
    ) -> Self {
        self.push_when(
            include,
            format!("{} BETWEEN ? AND ?", column),
            vec![low.into(), high.into()],
        )
    }

    /// `column NOT BETWEEN low AND high`
    fn not_between(self, column: &str, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.not_between_if(column, low, high, true)
    }

    fn not_between_if(
        self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
        include: bool,
    ) -> Self {
        self.push_when(
            include,
            format!("{} NOT BETWEEN ? AND ?", column),
            vec![low.into(), high.into()],
        )
    }

    // ==================== NULL checks ====================

    /// `column IS NULL`
    fn is_null(self, column: &str) -> Self {
        self.is_null_if(column, true)
    }

    fn is_null_if(self, column: &str, include: bool) -> Self {
        self.push_when(include, format!("{} IS NULL", column), Vec::new())
    }

    /// `column IS NOT NULL`
    fn is_not_null(self, column: &str) -> Self {
        self.is_not_null_if(column, true)
    }

    fn is_not_null_if(self, column: &str, include: bool) -> Self {
        self.push_when(include, format!("{} IS NOT NULL", column), Vec::new())
    }
}
