//! Clause nodes and the connector-aware condition list.
//!
//! A [`Conditions`] list is an ordered sequence of [`Clause`]s. Each clause
//! remembers whether it attaches to its predecessor with `AND` or `OR`; that
//! choice is made once, when the clause is appended, from the list's pending
//! connector.
//!
//! Fragments keep `?` placeholders. They are rewritten to `$n` only when the
//! final statement is rendered, so a fragment can be moved into a nested group
//! or a join without renumbering.

use crate::value::Value;

/// How a clause attaches to the clause before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    /// SQL keyword surrounded by spaces, ready to be pushed between fragments.
    pub fn as_sql(self) -> &'static str {
        match self {
            Connector::And => " AND ",
            Connector::Or => " OR ",
        }
    }
}

/// One predicate: a `?`-templated fragment, its values and its connector.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    fragment: String,
    params: Vec<Value>,
    connector: Connector,
}

impl Clause {
    pub(crate) fn new(fragment: String, params: Vec<Value>, connector: Connector) -> Self {
        Self {
            fragment,
            params,
            connector,
        }
    }

    /// The SQL fragment with `?` placeholders.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Values bound to the fragment's placeholders, in order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Connector to the previous clause. Ignored for the first clause.
    pub fn connector(&self) -> Connector {
        self.connector
    }
}

/// Ordered clause list with a one-shot pending connector.
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    nodes: Vec<Clause>,
    pending: Connector,
}

impl Conditions {
    /// Create an empty list. The pending connector starts as `AND`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no clause has been appended.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of clauses.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of bound values across all clauses.
    pub fn param_count(&self) -> usize {
        self.nodes.iter().map(|c| c.params.len()).sum()
    }

    /// The clauses in append order.
    pub fn clauses(&self) -> &[Clause] {
        &self.nodes
    }

    /// Connector the next appended clause will use.
    pub fn pending(&self) -> Connector {
        self.pending
    }

    /// Make the next appended clause attach with `OR`.
    pub fn set_or(&mut self) {
        self.pending = Connector::Or;
    }

    /// Make the next appended clause attach with `AND`.
    pub fn set_and(&mut self) {
        self.pending = Connector::And;
    }

    /// Read and reset the pending connector.
    fn take_pending(&mut self) -> Connector {
        std::mem::take(&mut self.pending)
    }

    /// Append a clause using the pending connector, then reset it.
    ///
    /// A blank fragment appends nothing but still resets the connector.
    pub fn push(&mut self, fragment: impl Into<String>, params: Vec<Value>) {
        let connector = self.take_pending();
        let fragment = fragment.into();
        if fragment.trim().is_empty() {
            return;
        }
        self.nodes.push(Clause::new(fragment, params, connector));
    }

    /// Append a rendered nested list as one parenthesised clause.
    ///
    /// The connector is captured before the nested list is inspected, so an
    /// empty group still consumes a pending `OR`.
    pub fn push_group(&mut self, nested: &Conditions) {
        let connector = self.take_pending();
        if nested.is_empty() {
            return;
        }
        let (sql, params) = nested.render();
        self.nodes
            .push(Clause::new(format!("({})", sql), params, connector));
    }

    /// Render to a single `?`-templated string plus its values in order.
    ///
    /// An empty list renders to `("", [])`.
    pub fn render(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::with_capacity(self.param_count());
        for (i, clause) in self.nodes.iter().enumerate() {
            if i > 0 {
                sql.push_str(clause.connector.as_sql());
            }
            sql.push_str(&clause.fragment);
            params.extend(clause.params.iter().cloned());
        }
        (sql, params)
    }

    /// Whether any clause after the first attaches with `OR`.
    pub(crate) fn has_or(&self) -> bool {
        self.nodes
            .iter()
            .skip(1)
            .any(|c| c.connector == Connector::Or)
    }
}
