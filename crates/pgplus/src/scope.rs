//! Execution context: collects the pieces wrappers apply and renders them into
//! a single statement.
//!
//! A `Scope` knows the target table, its primary key and soft-delete marker,
//! plus everything added through its boundary methods. Rendering never
//! consumes the scope, so the same scope can produce a count and a page query.

use crate::client::GenericClient;
use crate::config::Settings;
use crate::entity::{Entity, FromRow};
use crate::error::{MutationKind, OrmError, OrmResult};
use crate::page::Page;
use crate::statement::{SqlWriter, Statement};
use crate::value::Value;
use crate::wrapper::Conditions;

/// Right-hand side of one `SET` entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// `col = ?`
    Value(Value),
    /// `col = col + ?`
    Incr(Value),
    /// `col = col - ?`
    Decr(Value),
    /// `col = <expr>`, copied verbatim.
    Raw(String),
}

/// Statement builder and runner for one table.
#[derive(Debug, Clone)]
pub struct Scope {
    settings: Settings,
    table: String,
    primary_key: String,
    soft_delete_column: Option<String>,
    use_soft_delete: bool,
    unscoped: bool,
    columns: Vec<String>,
    distinct: bool,
    joins: Vec<(String, Vec<Value>)>,
    filters: Conditions,
    groups: Vec<String>,
    havings: Vec<(String, Vec<Value>)>,
    orders: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    assignments: Vec<(String, Assignment)>,
    rows: Vec<Vec<(String, Value)>>,
    allow_global: bool,
}

impl Scope {
    /// Scope over `table` keyed by `id`, without soft delete.
    pub fn new(table: impl Into<String>, settings: Settings) -> Self {
        Self {
            settings,
            table: table.into(),
            primary_key: "id".to_string(),
            soft_delete_column: None,
            use_soft_delete: true,
            unscoped: false,
            columns: Vec::new(),
            distinct: false,
            joins: Vec::new(),
            filters: Conditions::new(),
            groups: Vec::new(),
            havings: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            assignments: Vec::new(),
            rows: Vec::new(),
            allow_global: false,
        }
    }

    /// Scope configured from an entity's table, key and marker column.
    pub fn for_entity<T: Entity>(settings: Settings) -> Self {
        let mut scope = Self::new(T::TABLE, settings).primary_key(T::PRIMARY_KEY);
        scope.soft_delete_column = T::SOFT_DELETE.map(str::to_string);
        scope
    }

    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    /// Mark rows deleted through `column` instead of removing them.
    pub fn soft_delete_column(mut self, column: impl Into<String>) -> Self {
        self.soft_delete_column = Some(column.into());
        self
    }

    // ==================== boundary methods ====================

    /// AND a `?`-templated filter onto the WHERE clause.
    pub fn filter(mut self, fragment: impl Into<String>, params: Vec<Value>) -> Self {
        self.filters.push(fragment, params);
        self
    }

    /// OR a `?`-templated filter onto the WHERE clause.
    pub fn or_filter(mut self, fragment: impl Into<String>, params: Vec<Value>) -> Self {
        self.filters.set_or();
        self.filters.push(fragment, params);
        self
    }

    /// Append a complete join fragment such as `LEFT JOIN t ON t.a = ?`.
    pub fn join(mut self, fragment: impl Into<String>, params: Vec<Value>) -> Self {
        self.joins.push((fragment.into(), params));
        self
    }

    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Append an ORDER BY item, e.g. `created_at DESC`.
    pub fn order(mut self, clause: impl Into<String>) -> Self {
        self.orders.push(clause.into());
        self
    }

    pub fn group(mut self, column: impl Into<String>) -> Self {
        self.groups.push(column.into());
        self
    }

    /// AND a `?`-templated condition onto the HAVING clause.
    pub fn having(mut self, fragment: impl Into<String>, params: Vec<Value>) -> Self {
        self.havings.push((fragment.into(), params));
        self
    }

    /// Replace the FROM expression, e.g. `users u`.
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = name.into();
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

    /// Restrict to the rows of `page`. A page size of `0` leaves the scope
    /// unpaged.
    pub fn paginate<T>(self, page: &Page<T>) -> Self {
        if page.size > 0 {
            self.offset(page.offset()).limit(page.limit())
        } else {
            self
        }
    }

    /// Include soft-deleted rows and make deletes physical.
    pub fn unscoped(mut self) -> Self {
        self.unscoped = true;
        self
    }

    /// Choose between marking rows deleted (`true`, the default) and removing them.
    pub fn soft_delete(mut self, enabled: bool) -> Self {
        self.use_soft_delete = enabled;
        self
    }

    /// Set one column for UPDATE. A column assigned twice keeps its first
    /// position and takes the last value.
    pub fn assign(mut self, column: impl Into<String>, assignment: Assignment) -> Self {
        let column = column.into();
        match self.assignments.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = assignment,
            None => self.assignments.push((column, assignment)),
        }
        self
    }

    /// Add one INSERT row. Every row must list the same columns in the same
    /// order.
    pub fn push_row(mut self, values: Vec<(String, Value)>) -> Self {
        self.rows.push(values);
        self
    }

    /// Permit UPDATE/DELETE without a filter for this statement.
    pub fn allow_global(mut self, allowed: bool) -> Self {
        self.allow_global = allowed;
        self
    }

    // ==================== inspection ====================

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Name used to qualify columns: the last token of the FROM expression.
    pub fn alias(&self) -> &str {
        self.table.split_whitespace().last().unwrap_or(&self.table)
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Fail with [`OrmError::GlobalMutation`] when an UPDATE or DELETE would
    /// touch the whole table without an explicit opt-in.
    pub fn ensure_scoped(&self, kind: MutationKind) -> OrmResult<()> {
        if self.has_filters() || self.allow_global {
            return Ok(());
        }
        let allowed = match kind {
            MutationKind::Update => self.settings.allow_global_update,
            MutationKind::Delete => self.settings.allow_global_delete,
        };
        if allowed {
            return Ok(());
        }
        tracing::warn!(
            target: "pgplus.sql",
            kind = %kind,
            table = %self.table,
            "rejected statement without WHERE condition"
        );
        Err(OrmError::GlobalMutation(kind))
    }

    // ==================== rendering ====================

    /// `marker IS NULL` column for reads and updates, unless unscoped.
    fn read_marker(&self) -> Option<&str> {
        if self.unscoped {
            None
        } else {
            self.soft_delete_column.as_deref()
        }
    }

    /// Marker column a delete should set instead of removing rows.
    fn delete_marker(&self) -> Option<&str> {
        if self.use_soft_delete {
            self.read_marker()
        } else {
            None
        }
    }

    fn projection(&self) -> String {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };
        if self.distinct {
            format!("DISTINCT {}", columns)
        } else {
            columns
        }
    }

    fn write_joins(&self, w: &mut SqlWriter) {
        for (fragment, params) in &self.joins {
            w.push(" ");
            w.push_fragment(fragment, params);
        }
    }

    /// Write `WHERE <filters> [AND marker IS NULL]`, or nothing when both are
    /// absent.
    fn write_where(&self, w: &mut SqlWriter, marker: Option<String>) {
        let clauses = self.filters.clauses();
        let parts = clauses.len() + usize::from(marker.is_some());
        if parts == 0 {
            return;
        }
        w.push(" WHERE ");

        let wrap_all = marker.is_some() && self.filters.has_or();
        if wrap_all {
            w.push("(");
        }
        for (i, clause) in clauses.iter().enumerate() {
            if i > 0 {
                w.push(clause.connector().as_sql());
            }
            if parts > 1 && has_top_level_or(clause.fragment()) {
                w.push("(");
                w.push_fragment(clause.fragment(), clause.params());
                w.push(")");
            } else {
                w.push_fragment(clause.fragment(), clause.params());
            }
        }
        if wrap_all {
            w.push(")");
        }

        if let Some(marker) = marker {
            if !clauses.is_empty() {
                w.push(" AND ");
            }
            w.push(&marker);
            w.push(" IS NULL");
        }
    }

    fn write_from_where(&self, w: &mut SqlWriter) {
        w.push(" FROM ");
        w.push(&self.table);
        self.write_joins(w);
        let marker = self.read_marker().map(|m| {
            if self.joins.is_empty() {
                m.to_string()
            } else {
                format!("{}.{}", self.alias(), m)
            }
        });
        self.write_where(w, marker);
    }

    fn write_group_having(&self, w: &mut SqlWriter) {
        if !self.groups.is_empty() {
            w.push(" GROUP BY ");
            w.push(&self.groups.join(", "));
        }
        let multiple = self.havings.len() > 1;
        for (i, (fragment, params)) in self.havings.iter().enumerate() {
            w.push(if i == 0 { " HAVING " } else { " AND " });
            if multiple && has_top_level_or(fragment) {
                w.push("(");
                w.push_fragment(fragment, params);
                w.push(")");
            } else {
                w.push_fragment(fragment, params);
            }
        }
    }

    fn write_order_limit(&self, w: &mut SqlWriter) {
        if !self.orders.is_empty() {
            w.push(" ORDER BY ");
            w.push(&self.orders.join(", "));
        }
        if let Some(limit) = self.limit {
            w.push(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            w.push(&format!(" OFFSET {}", offset));
        }
    }

    /// WHERE for UPDATE/DELETE. PostgreSQL has no JOIN there, so joined
    /// filters run in a primary-key subquery.
    fn write_mutation_where(&self, w: &mut SqlWriter, marker: Option<&str>) {
        if self.joins.is_empty() {
            self.write_where(w, marker.map(str::to_string));
            return;
        }
        w.push(" WHERE ");
        w.push(&self.primary_key);
        w.push(" IN (SELECT ");
        w.push(&format!("{}.{}", self.alias(), self.primary_key));
        w.push(" FROM ");
        w.push(&self.table);
        self.write_joins(w);
        self.write_where(w, None);
        w.push(")");
        if let Some(marker) = marker {
            w.push(" AND ");
            w.push(marker);
            w.push(" IS NULL");
        }
    }

    /// `SELECT [DISTINCT] cols FROM t [joins] [WHERE] [GROUP BY] [HAVING]
    /// [ORDER BY] [LIMIT] [OFFSET]`
    pub fn to_select(&self) -> OrmResult<Statement> {
        let mut w = SqlWriter::new();
        w.push("SELECT ");
        w.push(&self.projection());
        self.write_from_where(&mut w);
        self.write_group_having(&mut w);
        self.write_order_limit(&mut w);
        Ok(w.finish())
    }

    /// Single-row select: ordered by primary key unless an order is set,
    /// limited to one row. DISTINCT selects are left unordered, since
    /// PostgreSQL requires ORDER BY items to appear in a DISTINCT select list.
    pub fn to_first(&self) -> OrmResult<Statement> {
        let mut scope = self.clone();
        if scope.orders.is_empty() && !scope.distinct {
            scope.orders.push(format!("{}.{}", self.alias(), self.primary_key));
        }
        scope.limit = Some(1);
        scope.to_select()
    }

    /// Row count ignoring order, limit and offset. Grouped or distinct
    /// queries are counted through a subquery.
    pub fn to_count(&self) -> OrmResult<Statement> {
        let mut w = SqlWriter::new();
        if self.groups.is_empty() && self.havings.is_empty() && !self.distinct {
            w.push("SELECT COUNT(*)");
            self.write_from_where(&mut w);
        } else {
            w.push("SELECT COUNT(*) FROM (SELECT ");
            if self.distinct {
                w.push(&self.projection());
            } else {
                w.push("1");
            }
            self.write_from_where(&mut w);
            self.write_group_having(&mut w);
            w.push(") AS t");
        }
        Ok(w.finish())
    }

    /// `INSERT INTO t (cols) VALUES (...), (...)`, or `DEFAULT VALUES` for a
    /// single row without columns.
    pub fn to_insert(&self) -> OrmResult<Statement> {
        let first = self
            .rows
            .first()
            .ok_or_else(|| OrmError::validation("insert has no rows"))?;

        let mut w = SqlWriter::new();
        w.push("INSERT INTO ");
        w.push(&self.table);

        if first.is_empty() {
            if self.rows.len() > 1 {
                return Err(OrmError::validation(
                    "DEFAULT VALUES insert supports a single row",
                ));
            }
            w.push(" DEFAULT VALUES");
            return Ok(w.finish());
        }

        let columns: Vec<&str> = first.iter().map(|(c, _)| c.as_str()).collect();
        w.push(" (");
        w.push(&columns.join(", "));
        w.push(") VALUES ");

        for (i, row) in self.rows.iter().enumerate() {
            let same_columns = row.len() == columns.len()
                && row.iter().zip(&columns).all(|((c, _), expected)| c == expected);
            if !same_columns {
                return Err(OrmError::validation(format!(
                    "insert row {} does not match the columns of the first row",
                    i
                )));
            }
            if i > 0 {
                w.push(", ");
            }
            w.push("(");
            for (j, (_, value)) in row.iter().enumerate() {
                if j > 0 {
                    w.push(", ");
                }
                w.push_value(value);
            }
            w.push(")");
        }
        Ok(w.finish())
    }

    /// `UPDATE t SET ... [WHERE ...]`
    pub fn to_update(&self) -> OrmResult<Statement> {
        if self.assignments.is_empty() {
            return Err(OrmError::validation("update has no SET assignments"));
        }
        self.ensure_scoped(MutationKind::Update)?;

        let mut w = SqlWriter::new();
        w.push("UPDATE ");
        w.push(&self.table);
        w.push(" SET ");
        for (i, (column, assignment)) in self.assignments.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push(column);
            w.push(" = ");
            match assignment {
                Assignment::Value(value) => w.push_value(value),
                Assignment::Incr(value) => {
                    w.push(&format!("{} + ", column));
                    w.push_value(value);
                }
                Assignment::Decr(value) => {
                    w.push(&format!("{} - ", column));
                    w.push_value(value);
                }
                Assignment::Raw(expr) => w.push(expr),
            }
        }
        self.write_mutation_where(&mut w, self.read_marker());
        Ok(w.finish())
    }

    /// `DELETE FROM t ...`, or `UPDATE t SET marker = NOW() ... AND marker IS NULL`
    /// for soft-deleted tables.
    pub fn to_delete(&self) -> OrmResult<Statement> {
        self.ensure_scoped(MutationKind::Delete)?;

        let mut w = SqlWriter::new();
        let marker = self.delete_marker();
        match marker {
            Some(column) => {
                w.push("UPDATE ");
                w.push(&self.table);
                w.push(&format!(" SET {} = NOW()", column));
            }
            None => {
                w.push("DELETE FROM ");
                w.push(&self.table);
            }
        }
        self.write_mutation_where(&mut w, marker);
        Ok(w.finish())
    }

    // ==================== terminals ====================

    fn log(&self, kind: &'static str, stmt: &Statement) {
        if self.settings.enable_sql_print {
            tracing::debug!(
                target: "pgplus.sql",
                kind,
                table = %self.table,
                param_count = stmt.params().len(),
                sql = %stmt.sql(),
                "statement"
            );
        }
    }

    /// Run the select and decode every row.
    pub async fn find<T: FromRow>(&self, conn: &impl GenericClient) -> OrmResult<Vec<T>> {
        let stmt = self.to_select()?;
        self.log("select", &stmt);
        let rows = conn.query(stmt.sql(), &stmt.params_ref()).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Run the single-row select. No row is [`OrmError::NotFound`].
    pub async fn first<T: FromRow>(&self, conn: &impl GenericClient) -> OrmResult<T> {
        let stmt = self.to_first()?;
        self.log("first", &stmt);
        let row = conn
            .query_opt(stmt.sql(), &stmt.params_ref())
            .await?
            .ok_or_else(|| OrmError::not_found(format!("no row in {}", self.table)))?;
        T::from_row(&row)
    }

    pub async fn count(&self, conn: &impl GenericClient) -> OrmResult<i64> {
        let stmt = self.to_count()?;
        self.log("count", &stmt);
        let row = conn.query_one(stmt.sql(), &stmt.params_ref()).await?;
        row.try_get::<_, i64>(0)
            .map_err(|e| OrmError::decode("count", e.to_string()))
    }

    /// Run the insert and return the number of rows written.
    pub async fn create(&self, conn: &impl GenericClient) -> OrmResult<u64> {
        let stmt = self.to_insert()?;
        self.log("insert", &stmt);
        conn.execute(stmt.sql(), &stmt.params_ref()).await
    }

    pub async fn updates(&self, conn: &impl GenericClient) -> OrmResult<u64> {
        let stmt = self.to_update()?;
        self.log("update", &stmt);
        conn.execute(stmt.sql(), &stmt.params_ref()).await
    }

    pub async fn delete(&self, conn: &impl GenericClient) -> OrmResult<u64> {
        let stmt = self.to_delete()?;
        self.log("delete", &stmt);
        conn.execute(stmt.sql(), &stmt.params_ref()).await
    }
}

/// Whether `fragment` has an `OR` outside parentheses and string literals.
fn has_top_level_or(fragment: &str) -> bool {
    let bytes = fragment.as_bytes();
    let mut depth = 0i32;
    let mut quoted = false;
    for (i, b) in bytes.iter().enumerate() {
        match *b {
            b'\'' => quoted = !quoted,
            b'(' if !quoted => depth += 1,
            b')' if !quoted => depth -= 1,
            b' ' if !quoted && depth == 0 => {
                if i + 4 <= bytes.len() && bytes[i + 1..i + 4].eq_ignore_ascii_case(b"OR ") {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Scope {
        Scope::new("users", Settings::default())
    }

    fn soft_users() -> Scope {
        users().soft_delete_column("deleted_at")
    }

    #[test]
    fn test_select_all_clauses_in_order() {
        let stmt = users()
            .select(["dept", "COUNT(*)"])
            .join("LEFT JOIN depts d ON d.id = users.dept_id AND d.active = ?", vec![true.into()])
            .filter("age > ?", vec![18.into()])
            .group("dept")
            .having("COUNT(*) > ?", vec![2.into()])
            .order("dept ASC")
            .limit(10)
            .offset(20)
            .to_select()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT dept, COUNT(*) FROM users LEFT JOIN depts d ON d.id = users.dept_id AND d.active = $1 \
             WHERE age > $2 GROUP BY dept HAVING COUNT(*) > $3 ORDER BY dept ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(stmt.params(), &[Value::Bool(true), Value::Int(18), Value::Int(2)]);
    }

    #[test]
    fn test_select_defaults_to_star() {
        assert_eq!(users().to_select().unwrap().sql(), "SELECT * FROM users");
        assert_eq!(
            users().select(["name"]).distinct().to_select().unwrap().sql(),
            "SELECT DISTINCT name FROM users"
        );
    }

    #[test]
    fn test_or_filter_connects_with_or() {
        let stmt = users()
            .filter("a = ?", vec![1.into()])
            .or_filter("b = ?", vec![2.into()])
            .to_select()
            .unwrap();
        assert_eq!(stmt.sql(), "SELECT * FROM users WHERE a = $1 OR b = $2");
    }

    #[test]
    fn test_soft_delete_marker_wraps_or_filters() {
        let stmt = soft_users()
            .filter("a = ? OR b = ?", vec![1.into(), 2.into()])
            .to_select()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT * FROM users WHERE (a = $1 OR b = $2) AND deleted_at IS NULL"
        );

        let stmt = soft_users()
            .filter("a = ?", vec![1.into()])
            .or_filter("b = ?", vec![2.into()])
            .to_select()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT * FROM users WHERE (a = $1 OR b = $2) AND deleted_at IS NULL"
        );
    }

    #[test]
    fn test_grouped_or_is_not_wrapped_twice() {
        let stmt = soft_users()
            .filter("(a = ? OR b = ?)", vec![1.into(), 2.into()])
            .to_select()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT * FROM users WHERE (a = $1 OR b = $2) AND deleted_at IS NULL"
        );
    }

    #[test]
    fn test_unscoped_skips_marker() {
        let stmt = soft_users().unscoped().to_select().unwrap();
        assert_eq!(stmt.sql(), "SELECT * FROM users");
    }

    #[test]
    fn test_marker_is_qualified_when_joined() {
        let stmt = soft_users()
            .table("users u")
            .join("INNER JOIN orders o ON o.user_id = u.id", vec![])
            .to_select()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT * FROM users u INNER JOIN orders o ON o.user_id = u.id WHERE u.deleted_at IS NULL"
        );
    }

    #[test]
    fn test_first_orders_by_primary_key() {
        let stmt = users().filter("name = ?", vec!["a".into()]).to_first().unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT * FROM users WHERE name = $1 ORDER BY users.id LIMIT 1"
        );
        let stmt = users().order("name DESC").to_first().unwrap();
        assert_eq!(stmt.sql(), "SELECT * FROM users ORDER BY name DESC LIMIT 1");
    }

    #[test]
    fn test_paginate_applies_offset_and_limit() {
        let page: Page<()> = Page::new(3, 10);
        let stmt = users().order("id ASC").paginate(&page).to_select().unwrap();
        assert_eq!(stmt.sql(), "SELECT * FROM users ORDER BY id ASC LIMIT 10 OFFSET 20");

        let unpaged: Page<()> = Page::new(3, 0);
        let stmt = users().limit(5).paginate(&unpaged).to_select().unwrap();
        assert_eq!(stmt.sql(), "SELECT * FROM users LIMIT 5");

        let first: Page<()> = Page::new(1, 10);
        let count = users().paginate(&first).to_count().unwrap();
        assert_eq!(count.sql(), "SELECT COUNT(*) FROM users");
    }

    #[test]
    fn test_first_distinct_skips_key_order() {
        let stmt = users().select(["name"]).distinct().to_first().unwrap();
        assert_eq!(stmt.sql(), "SELECT DISTINCT name FROM users LIMIT 1");
    }

    #[test]
    fn test_multiple_havings_keep_or_grouped() {
        let stmt = users()
            .group("dept")
            .having("COUNT(*) > ? OR SUM(x) > ?", vec![1.into(), 2.into()])
            .having("MAX(y) < ?", vec![3.into()])
            .to_select()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT * FROM users GROUP BY dept HAVING (COUNT(*) > $1 OR SUM(x) > $2) AND MAX(y) < $3"
        );

        let stmt = users()
            .group("dept")
            .having("COUNT(*) > ? OR SUM(x) > ?", vec![1.into(), 2.into()])
            .to_select()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT * FROM users GROUP BY dept HAVING COUNT(*) > $1 OR SUM(x) > $2"
        );
    }

    #[test]
    fn test_count_ignores_order_and_paging() {
        let stmt = users()
            .filter("age > ?", vec![1.into()])
            .order("id")
            .limit(5)
            .offset(10)
            .to_count()
            .unwrap();
        assert_eq!(stmt.sql(), "SELECT COUNT(*) FROM users WHERE age > $1");
    }

    #[test]
    fn test_grouped_count_uses_subquery() {
        let stmt = users()
            .group("dept")
            .having("COUNT(*) > ?", vec![1.into()])
            .to_count()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT COUNT(*) FROM (SELECT 1 FROM users GROUP BY dept HAVING COUNT(*) > $1) AS t"
        );
    }

    #[test]
    fn test_insert_single_and_multi_row() {
        let stmt = users()
            .push_row(vec![("name".into(), "a".into()), ("age".into(), 1.into())])
            .push_row(vec![("name".into(), "b".into()), ("age".into(), 2.into())])
            .to_insert()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "INSERT INTO users (name, age) VALUES ($1, $2), ($3, $4)"
        );
        assert_eq!(stmt.params().len(), 4);
    }

    #[test]
    fn test_insert_default_values_and_errors() {
        let stmt = users().push_row(Vec::new()).to_insert().unwrap();
        assert_eq!(stmt.sql(), "INSERT INTO users DEFAULT VALUES");

        assert!(matches!(users().to_insert(), Err(OrmError::Validation(_))));

        let mismatched = users()
            .push_row(vec![("name".into(), "a".into())])
            .push_row(vec![("age".into(), 1.into())])
            .to_insert();
        assert!(matches!(mismatched, Err(OrmError::Validation(_))));
    }

    #[test]
    fn test_update_assignments() {
        let stmt = users()
            .assign("name", Assignment::Value("a".into()))
            .assign("visits", Assignment::Incr(1.into()))
            .assign("credit", Assignment::Decr(5.into()))
            .assign("updated_at", Assignment::Raw("NOW()".into()))
            .assign("name", Assignment::Value("b".into()))
            .filter("id = ?", vec![7.into()])
            .to_update()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "UPDATE users SET name = $1, visits = visits + $2, credit = credit - $3, updated_at = NOW() WHERE id = $4"
        );
        assert_eq!(stmt.params()[0], Value::Text("b".into()));
    }

    #[test]
    fn test_update_requires_assignments() {
        let err = users().filter("id = ?", vec![1.into()]).to_update().unwrap_err();
        assert!(matches!(err, OrmError::Validation(_)));
    }

    #[test]
    fn test_global_mutation_guard() {
        let scope = users().assign("a", Assignment::Value(1.into()));
        assert!(scope.to_update().unwrap_err().is_global_mutation());
        assert!(users().to_delete().unwrap_err().is_global_mutation());

        let stmt = scope.clone().allow_global(true).to_update().unwrap();
        assert_eq!(stmt.sql(), "UPDATE users SET a = $1");

        let permissive = Scope::new("users", Settings::new().allow_global_delete(true));
        assert_eq!(permissive.to_delete().unwrap().sql(), "DELETE FROM users");
        let update = permissive.assign("a", Assignment::Value(1.into())).to_update();
        assert!(update.unwrap_err().is_global_mutation());
    }

    #[test]
    fn test_soft_delete_renders_update() {
        let stmt = soft_users()
            .filter("id = ?", vec![1.into()])
            .to_delete()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL"
        );

        let stmt = soft_users()
            .soft_delete(false)
            .filter("id = ?", vec![1.into()])
            .to_delete()
            .unwrap();
        assert_eq!(stmt.sql(), "DELETE FROM users WHERE id = $1");

        let stmt = soft_users()
            .unscoped()
            .filter("id = ?", vec![1.into()])
            .to_delete()
            .unwrap();
        assert_eq!(stmt.sql(), "DELETE FROM users WHERE id = $1");
    }

    #[test]
    fn test_joined_mutation_uses_key_subquery() {
        let stmt = users()
            .table("users u")
            .join("INNER JOIN orders o ON o.user_id = u.id AND o.total > ?", vec![100.into()])
            .filter("o.status = ?", vec!["void".into()])
            .to_delete()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "DELETE FROM users u WHERE id IN (SELECT u.id FROM users u \
             INNER JOIN orders o ON o.user_id = u.id AND o.total > $1 WHERE o.status = $2)"
        );
    }

    #[test]
    fn test_top_level_or_detection() {
        assert!(has_top_level_or("a = ? OR b = ?"));
        assert!(has_top_level_or("a = ? or b = ?"));
        assert!(!has_top_level_or("(a = ? OR b = ?)"));
        assert!(!has_top_level_or("a = 'x OR y'"));
        assert!(!has_top_level_or("color = ?"));
    }
}
