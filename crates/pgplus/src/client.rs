//! The execution seam between a [`Scope`](crate::Scope) and PostgreSQL.

use crate::error::{OrmError, OrmResult};
use std::future::Future;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Anything that can run a rendered statement: a connection, a pooled
/// connection or an open transaction.
///
/// Implementors own pooling, timeouts and cancellation. Only `query` and
/// `execute` are required.
pub trait GenericClient: Send + Sync {
    /// Run a statement and collect every row.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = OrmResult<Vec<Row>>> + Send;

    /// Run a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = OrmResult<u64>> + Send;

    /// First row, or `None`. Extra rows are discarded.
    fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = OrmResult<Option<Row>>> + Send {
        async move { Ok(self.query(sql, params).await?.into_iter().next()) }
    }

    /// First row; an empty result is [`OrmError::NotFound`].
    fn query_one(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = OrmResult<Row>> + Send {
        async move {
            self.query_opt(sql, params)
                .await?
                .ok_or_else(|| OrmError::not_found("statement returned no rows"))
        }
    }
}

/// Forward to the inherent driver methods, classifying constraint errors.
macro_rules! driver_client {
    ($($ty:ty),* $(,)?) => {
        $(
            impl GenericClient for $ty {
                async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<Vec<Row>> {
                    <$ty>::query(self, sql, params)
                        .await
                        .map_err(OrmError::from_db_error)
                }

                async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
                    <$ty>::execute(self, sql, params)
                        .await
                        .map_err(OrmError::from_db_error)
                }
            }
        )*
    };
}

driver_client!(tokio_postgres::Client, tokio_postgres::Transaction<'_>);

// Pooled objects deref to the driver types above.

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<Vec<Row>> {
        let inner: &tokio_postgres::Client = self;
        GenericClient::query(inner, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
        let inner: &tokio_postgres::Client = self;
        GenericClient::execute(inner, sql, params).await
    }
}

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<Vec<Row>> {
        let inner: &tokio_postgres::Transaction<'_> = self;
        GenericClient::query(inner, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
        let inner: &tokio_postgres::Transaction<'_> = self;
        GenericClient::execute(inner, sql, params).await
    }
}
