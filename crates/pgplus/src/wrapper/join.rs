//! JOIN clauses and the ON-condition builder.

use super::clause::Conditions;
use super::conditional::Conditional;
use crate::value::Value;

/// Join flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

/// One recorded join: `KIND JOIN table ON condition`, with `?` placeholders
/// in the condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    kind: JoinKind,
    table: String,
    on: String,
    params: Vec<Value>,
}

impl Join {
    pub fn new(kind: JoinKind, table: impl Into<String>, on: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            kind,
            table: table.into(),
            on: on.into(),
            params,
        }
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Rendered join fragment and its values.
    pub fn to_fragment(&self) -> (String, Vec<Value>) {
        let sql = if self.on.trim().is_empty() {
            format!("{} {}", self.kind.as_sql(), self.table)
        } else {
            format!("{} {} ON {}", self.kind.as_sql(), self.table, self.on)
        };
        (sql, self.params.clone())
    }
}

/// Condition builder scoped to a single ON clause.
///
/// # Example
/// ```ignore
/// let (on, params) = JoinOn::new()
///     .eq_column("u.id", "o.user_id")
///     .gt("o.amount", 10)
///     .build();
/// assert_eq!(on, "u.id = o.user_id AND o.amount > ?");
/// ```
#[derive(Debug, Clone, Default)]
pub struct JoinOn {
    conditions: Conditions,
}

impl JoinOn {
    pub fn new() -> Self {
        Self::default()
    }

    /// `left = right` between two columns, no parameter.
    pub fn eq_column(self, left: &str, right: &str) -> Self {
        self.eq_column_if(left, right, true)
    }

    pub fn eq_column_if(self, left: &str, right: &str, include: bool) -> Self {
        self.push_when(include, format!("{} = {}", left, right), Vec::new())
    }

    /// Append a hand-written fragment with `?` placeholders.
    ///
    /// A blank fragment is ignored.
    pub fn raw(mut self, fragment: &str, params: Vec<Value>) -> Self {
        self.conditions.push(fragment, params);
        self
    }

    /// Render the ON condition. Calling it repeatedly yields equal results.
    pub fn build(&self) -> (String, Vec<Value>) {
        self.conditions.render()
    }
}

impl Conditional for JoinOn {
    fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut Conditions {
        &mut self.conditions
    }

    fn nested(&self) -> Self {
        JoinOn::new()
    }
}

/// Join methods for builders that read from (or filter through) a FROM list.
pub trait Joinable: Sized {
    /// Joins recorded so far, in call order.
    fn joins_mut(&mut self) -> &mut Vec<Join>;

    #[doc(hidden)]
    fn push_join(mut self, kind: JoinKind, table: &str, on: String, params: Vec<Value>) -> Self {
        self.joins_mut().push(Join::new(kind, table, on, params));
        self
    }

    #[doc(hidden)]
    fn push_join_on<F>(self, kind: JoinKind, table: &str, left_key: &str, right_key: &str, f: F) -> Self
    where
        F: FnOnce(JoinOn) -> JoinOn,
    {
        let (on, params) = f(JoinOn::new().eq_column(left_key, right_key)).build();
        self.push_join(kind, table, on, params)
    }

    /// `LEFT JOIN table ON on`
    fn left_join(self, table: &str, on: &str) -> Self {
        self.push_join(JoinKind::Left, table, on.to_string(), Vec::new())
    }

    /// `RIGHT JOIN table ON on`
    fn right_join(self, table: &str, on: &str) -> Self {
        self.push_join(JoinKind::Right, table, on.to_string(), Vec::new())
    }

    /// `INNER JOIN table ON on`
    fn inner_join(self, table: &str, on: &str) -> Self {
        self.push_join(JoinKind::Inner, table, on.to_string(), Vec::new())
    }

    /// `LEFT JOIN table ON left_key = right_key [AND ...]`, extra conditions
    /// added by `f`.
    fn left_join_on<F>(self, table: &str, left_key: &str, right_key: &str, f: F) -> Self
    where
        F: FnOnce(JoinOn) -> JoinOn,
    {
        self.push_join_on(JoinKind::Left, table, left_key, right_key, f)
    }

    fn right_join_on<F>(self, table: &str, left_key: &str, right_key: &str, f: F) -> Self
    where
        F: FnOnce(JoinOn) -> JoinOn,
    {
        self.push_join_on(JoinKind::Right, table, left_key, right_key, f)
    }

    fn inner_join_on<F>(self, table: &str, left_key: &str, right_key: &str, f: F) -> Self
    where
        F: FnOnce(JoinOn) -> JoinOn,
    {
        self.push_join_on(JoinKind::Inner, table, left_key, right_key, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_on_build_is_idempotent() {
        let on = JoinOn::new().eq_column("a.id", "b.a_id").gt("b.amt", 10);
        let first = on.build();
        assert_eq!(first.0, "a.id = b.a_id AND b.amt > ?");
        assert_eq!(first.1, vec![Value::Int(10)]);
        assert_eq!(on.build(), first);
    }

    #[test]
    fn test_join_on_empty_builds_empty() {
        let (sql, params) = JoinOn::new().build();
        assert_eq!(sql, "");
        assert!(params.is_empty());
    }

    #[test]
    fn test_join_on_nested_group_and_or() {
        let (sql, params) = JoinOn::new()
            .eq_column("u.id", "o.user_id")
            .or()
            .or_nested(|j| j.eq("o.status", "paid").is_not_null("o.paid_at"))
            .build();
        assert_eq!(sql, "u.id = o.user_id OR (o.status = ? AND o.paid_at IS NOT NULL)");
        assert_eq!(params, vec![Value::Text("paid".into())]);
    }

    #[test]
    fn test_join_on_raw_and_conditional_column() {
        let (sql, params) = JoinOn::new()
            .eq_column_if("a.x", "b.x", false)
            .raw("b.kind = ANY(?)", vec![Value::Text("k".into())])
            .raw("  ", vec![])
            .build();
        assert_eq!(sql, "b.kind = ANY(?)");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_join_fragment_without_condition() {
        let join = Join::new(JoinKind::Inner, "t", "", Vec::new());
        assert_eq!(join.to_fragment().0, "INNER JOIN t");
        let join = Join::new(JoinKind::Left, "t", "t.a = s.a", Vec::new());
        assert_eq!(join.to_fragment().0, "LEFT JOIN t ON t.a = s.a");
    }
}
