//! Condition wrappers.
//!
//! Four builders share one clause grammar ([`Conditional`]) and, except for
//! inserts, one join grammar ([`Joinable`]):
//!
//! - [`QueryWrapper`] renders SELECT / COUNT
//! - [`UpdateWrapper`] renders UPDATE
//! - [`DeleteWrapper`] renders DELETE (or a soft-delete UPDATE)
//! - [`InsertWrapper`] renders INSERT
//!
//! A wrapper never talks to the database. It is applied to a [`Scope`], which
//! renders and runs the statement.
//!
//! # Usage
//!
//! ```ignore
//! use pgplus::prelude::*;
//!
//! let q = wrapper::query::<User>()
//!     .eq("status", "active")
//!     .and_nested(|w| w.gt("age", 18).or().is_null("age"))
//!     .left_join_on("orders o", "users.id", "o.user_id", |on| on.gt("o.total", 100))
//!     .order_by_desc("users.created_at");
//!
//! let stmt = q.apply(Scope::for_entity::<User>(Settings::default()))?.to_select()?;
//! // SELECT * FROM users LEFT JOIN orders o ON users.id = o.user_id AND o.total > $1
//! //   WHERE status = $2 AND (age > $3 OR age IS NULL) ORDER BY users.created_at DESC
//! ```

mod clause;
mod conditional;
mod delete;
mod insert;
mod join;
mod select;
mod update;


pub use clause::{Clause, Conditions, Connector};
pub use conditional::Conditional;
pub use delete::DeleteWrapper;
pub use insert::InsertWrapper;
pub use join::{Join, JoinKind, JoinOn, Joinable};
pub use select::QueryWrapper;
pub use update::UpdateWrapper;

use crate::error::OrmResult;
use crate::scope::Scope;

/// Transfer a wrapper's state onto an execution context.
///
/// Applying the same wrapper to equal scopes yields equal statements.
pub trait Apply {
    fn apply(&self, scope: Scope) -> OrmResult<Scope>;
}

/// Create a SELECT wrapper for entity `T`.
pub fn query<T>() -> QueryWrapper<T> {
    QueryWrapper::new()
}

/// Create an UPDATE wrapper for entity `T`.
pub fn update<T>() -> UpdateWrapper<T> {
    UpdateWrapper::new()
}

/// Create a DELETE wrapper for entity `T`.
pub fn delete<T>() -> DeleteWrapper<T> {
    DeleteWrapper::new()
}

/// Create an INSERT wrapper for entity `T`.
pub fn insert<T>() -> InsertWrapper<T> {
    InsertWrapper::new()
}
