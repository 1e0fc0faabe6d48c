//! # pgplus
//!
//! Fluent, entity-typed condition wrappers for PostgreSQL.
//!
//! ## Features
//!
//! - **One clause grammar**: `eq`, `like`, `in_list`, `between`, ... with `_if`
//!   twins for optional filters, `or()` connectors and nested groups
//! - **Join conditions**: `left_join_on(table, left, right, |on| ...)` with a
//!   scoped ON builder
//! - **Deterministic rendering**: `?` placeholders become `$n` in output order;
//!   collections expand to one placeholder per element
//! - **Safe defaults**: UPDATE/DELETE without a condition is rejected unless
//!   explicitly allowed; soft-deleted rows are hidden from reads
//! - **Transaction-friendly**: every call takes a `GenericClient`, so a pooled
//!   connection or an open transaction works the same way
//!
//! ## Usage
//!
//! ```ignore
//! use pgplus::prelude::*;
//!
//! let users = Service::<User>::new(Settings::load("pgplus.toml")?);
//!
//! // SELECT
//! let adults = users
//!     .list(&client, &QueryWrapper::new().ge("age", 18).order_by_asc("name"))
//!     .await?;
//!
//! // UPDATE
//! users
//!     .update(&client, &UpdateWrapper::new().set("status", "inactive").eq("id", 7))
//!     .await?;
//!
//! // DELETE (marks `deleted_at` when the entity declares it)
//! users
//!     .delete(&client, &DeleteWrapper::new().in_list("id", [1, 2, 3]))
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod page;
pub mod prelude;
pub mod scope;
pub mod service;
pub mod statement;
pub mod value;
pub mod wrapper;

pub use client::GenericClient;
pub use config::Settings;
pub use entity::{Entity, FromRow, RowExt};
pub use error::{MutationKind, OrmError, OrmResult};
pub use page::Page;
pub use scope::{Assignment, Scope};
pub use service::{BATCH_SIZE, Service, select_list, select_one, select_page};
pub use statement::Statement;
pub use value::Value;

pub use wrapper::{
    Apply, Clause, Conditional, Conditions, Connector, DeleteWrapper, InsertWrapper, Join,
    JoinKind, JoinOn, Joinable, QueryWrapper, UpdateWrapper,
};
