//! Convenient imports for typical `pgplus` usage.
//!
//! ```ignore
//! use pgplus::prelude::*;
//! ```
//!
//! Brings the wrapper traits into scope, which the builder methods need.

pub use crate::{
    Apply, Conditional, DeleteWrapper, Entity, FromRow, GenericClient, InsertWrapper, JoinOn,
    Joinable, OrmError, OrmResult, Page, QueryWrapper, RowExt, Scope, Service, Settings,
    UpdateWrapper, Value,
};
pub use crate::wrapper;
