//! Record-type traits implemented by the application.
//!
//! pgplus does no reflection: an entity tells the wrappers which table it
//! lives in, how it is keyed, whether it is soft-deleted, and which column
//! values it writes.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Decode a record from one result row.
///
/// ```ignore
/// impl FromRow for User {
///     fn from_row(row: &Row) -> OrmResult<Self> {
///         Ok(Self {
///             id: row.try_get_column("id")?,
///             name: row.try_get_column("name")?,
///             deleted_at: row.try_get_column("deleted_at")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> OrmResult<Self>;
}

/// Column access that reports failures as [`OrmError::Decode`].
pub trait RowExt {
    fn try_get_column<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'a> FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| OrmError::decode(column, e.to_string()))
    }
}

/// A record type mapped to one table.
///
/// # Example
/// ```ignore
/// struct User { id: i64, name: String, deleted_at: Option<NaiveDateTime> }
///
/// impl Entity for User {
///     const TABLE: &'static str = "users";
///     const SOFT_DELETE: Option<&'static str> = Some("deleted_at");
///
///     fn id(&self) -> Value {
///         self.id.into()
///     }
///
///     fn insert_values(&self) -> Vec<(&'static str, Value)> {
///         vec![("name", self.name.clone().into())]
///     }
/// }
/// ```
pub trait Entity: FromRow + Send + Sync {
    /// Table name used when a wrapper does not override it.
    const TABLE: &'static str;

    /// Primary key column.
    const PRIMARY_KEY: &'static str = "id";

    /// Deletion marker column. When set, deletes become
    /// `UPDATE .. SET marker = NOW()` and reads skip marked rows.
    const SOFT_DELETE: Option<&'static str> = None;

    /// Primary key value of this record.
    fn id(&self) -> Value;

    /// Columns written by `save`/`save_batch`, in column order.
    fn insert_values(&self) -> Vec<(&'static str, Value)>;

    /// Columns written by `update_by_id`. Defaults to the insert columns
    /// without the primary key.
    fn update_values(&self) -> Vec<(&'static str, Value)> {
        self.insert_values()
            .into_iter()
            .filter(|(column, _)| *column != Self::PRIMARY_KEY)
            .collect()
    }
}
