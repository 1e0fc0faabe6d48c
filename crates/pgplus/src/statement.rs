//! Final SQL text plus bound values, and the writer that numbers placeholders.

use crate::value::Value;
use tokio_postgres::types::ToSql;

/// A rendered statement ready to hand to a [`GenericClient`](crate::GenericClient).
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    /// SQL text with `$n` placeholders.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bound values, one per placeholder.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Get parameters as references compatible with tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Appends SQL pieces in output order, numbering placeholders as it goes.
#[derive(Debug, Default)]
pub(crate) struct SqlWriter {
    sql: String,
    params: Vec<Value>,
}

impl SqlWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append literal SQL.
    pub(crate) fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Bind one value and append its placeholder.
    pub(crate) fn push_value(&mut self, value: &Value) {
        match value {
            Value::List(items) if items.is_empty() => self.sql.push_str("NULL"),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.sql.push_str(", ");
                    }
                    self.bind(item.clone());
                }
            }
            other => self.bind(other.clone()),
        }
    }

    fn bind(&mut self, value: Value) {
        self.params.push(value);
        self.sql.push('$');
        self.sql.push_str(&self.params.len().to_string());
    }

    /// Append a `?`-templated fragment.
    ///
    /// Each `?` takes the next value from `params`; list values expand to one
    /// placeholder per element and an empty list to `NULL`. A `?` with no
    /// value left is copied through unchanged.
    pub(crate) fn push_fragment(&mut self, fragment: &str, params: &[Value]) {
        let mut next = params.iter();
        for ch in fragment.chars() {
            if ch == '?' {
                match next.next() {
                    Some(value) => self.push_value(value),
                    None => self.sql.push(ch),
                }
            } else {
                self.sql.push(ch);
            }
        }
    }

    pub(crate) fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_continue_across_fragments() {
        let mut w = SqlWriter::new();
        w.push("UPDATE t SET ");
        w.push_fragment("a = ?", &[Value::Int(1)]);
        w.push(" WHERE ");
        w.push_fragment("b = ? AND c = ?", &[Value::Int(2), Value::Int(3)]);
        let stmt = w.finish();
        assert_eq!(stmt.sql(), "UPDATE t SET a = $1 WHERE b = $2 AND c = $3");
        assert_eq!(stmt.params().len(), 3);
    }

    #[test]
    fn test_list_expands_and_empty_list_is_null() {
        let mut w = SqlWriter::new();
        w.push_fragment("id IN (?)", &[Value::list([1, 2, 3])]);
        w.push(" AND ");
        w.push_fragment("x NOT IN (?)", &[Value::List(vec![])]);
        let stmt = w.finish();
        assert_eq!(stmt.sql(), "id IN ($1, $2, $3) AND x NOT IN (NULL)");
        assert_eq!(stmt.params(), &[Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn test_extra_question_mark_is_kept() {
        let mut w = SqlWriter::new();
        w.push_fragment("a = ? AND b = ?", &[Value::Int(1)]);
        let stmt = w.finish();
        assert_eq!(stmt.sql(), "a = $1 AND b = ?");
        assert_eq!(stmt.params().len(), 1);
    }

    #[test]
    fn test_params_ref_matches_params() {
        let mut w = SqlWriter::new();
        w.push_fragment("a = ? AND b = ?", &[Value::Int(1), Value::from("x")]);
        let stmt = w.finish();
        assert_eq!(stmt.params_ref().len(), 2);
        assert_eq!(stmt.to_string(), "a = $1 AND b = $2");
    }
}
