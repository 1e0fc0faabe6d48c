//! Generic CRUD façade over the wrappers.
//!
//! ```ignore
//! let users = Service::<User>::new(settings);
//!
//! users.save(&client, &user).await?;
//! let page = users
//!     .select_page(&client, 1, 20, &QueryWrapper::new().eq("status", "active"))
//!     .await?;
//! users.remove_by_ids(&client, [1i64, 2, 3]).await?;
//! ```

use crate::client::GenericClient;
use crate::config::Settings;
use crate::entity::Entity;
use crate::error::OrmResult;
use crate::page::Page;
use crate::scope::{Assignment, Scope};
use crate::value::Value;
use crate::wrapper::{Apply, DeleteWrapper, InsertWrapper, QueryWrapper, UpdateWrapper};
use std::marker::PhantomData;

/// Rows per INSERT statement in [`Service::save_batch`].
pub const BATCH_SIZE: usize = 100;

/// CRUD operations for entity `T`.
///
/// The service holds no connection: every call takes the client or
/// transaction to run on.
pub struct Service<T> {
    settings: Settings,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Default for Service<T> {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl<T> Clone for Service<T> {
    fn clone(&self) -> Self {
        Self::new(self.settings)
    }
}

impl<T> Service<T> {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            _entity: PhantomData,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

fn owned_columns(values: Vec<(&'static str, Value)>) -> Vec<(String, Value)> {
    values
        .into_iter()
        .map(|(column, value)| (column.to_string(), value))
        .collect()
}

impl<T: Entity> Service<T> {
    /// Fresh execution context for `T`.
    pub fn scope(&self) -> Scope {
        Scope::for_entity::<T>(self.settings)
    }

    fn by_id(&self, id: Value) -> Scope {
        self.scope().filter(format!("{} = ?", T::PRIMARY_KEY), vec![id])
    }

    /// Insert one entity.
    pub async fn save(&self, conn: &impl GenericClient, entity: &T) -> OrmResult<u64> {
        self.scope()
            .push_row(owned_columns(entity.insert_values()))
            .create(conn)
            .await
    }

    /// Insert entities with multi-row INSERTs of at most [`BATCH_SIZE`] rows.
    pub async fn save_batch(&self, conn: &impl GenericClient, entities: &[T]) -> OrmResult<u64> {
        let mut written = 0;
        for chunk in entities.chunks(BATCH_SIZE) {
            let scope = chunk.iter().fold(self.scope(), |scope, entity| {
                scope.push_row(owned_columns(entity.insert_values()))
            });
            written += scope.create(conn).await?;
        }
        Ok(written)
    }

    /// Delete by primary key. Soft-deleted entities are marked instead.
    pub async fn remove_by_id(&self, conn: &impl GenericClient, id: impl Into<Value>) -> OrmResult<u64> {
        self.by_id(id.into()).delete(conn).await
    }

    /// Delete every row whose primary key is in `ids`. An empty set deletes
    /// nothing and skips the round trip.
    pub async fn remove_by_ids<I>(&self, conn: &impl GenericClient, ids: I) -> OrmResult<u64>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let ids: Vec<Value> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return Ok(0);
        }
        self.scope()
            .filter(format!("{} IN (?)", T::PRIMARY_KEY), vec![Value::List(ids)])
            .delete(conn)
            .await
    }

    /// Write `update_values()` to the row with the entity's key.
    pub async fn update_by_id(&self, conn: &impl GenericClient, entity: &T) -> OrmResult<u64> {
        entity
            .update_values()
            .into_iter()
            .fold(self.by_id(entity.id()), |scope, (column, value)| {
                scope.assign(column, Assignment::Value(value))
            })
            .updates(conn)
            .await
    }

    /// Load by primary key. Missing rows are [`OrmError::NotFound`](crate::OrmError::NotFound).
    pub async fn get_by_id(&self, conn: &impl GenericClient, id: impl Into<Value>) -> OrmResult<T> {
        self.by_id(id.into()).first(conn).await
    }

    /// First row matching `wrapper`, ordered by primary key unless it orders.
    pub async fn get_one(&self, conn: &impl GenericClient, wrapper: &QueryWrapper<T>) -> OrmResult<T> {
        wrapper.apply(self.scope())?.first(conn).await
    }

    pub async fn list(&self, conn: &impl GenericClient, wrapper: &QueryWrapper<T>) -> OrmResult<Vec<T>> {
        wrapper.apply(self.scope())?.find(conn).await
    }

    /// Fill `page` with its total and records.
    ///
    /// The count runs first; with no matching rows the record query is
    /// skipped. A page size of 0 returns every row.
    pub async fn page(
        &self,
        conn: &impl GenericClient,
        mut page: Page<T>,
        wrapper: &QueryWrapper<T>,
    ) -> OrmResult<Page<T>> {
        let scope = wrapper.apply(self.scope())?;
        page.total = scope.count(conn).await?;
        if page.total == 0 {
            return Ok(page);
        }
        page.records = scope.paginate(&page).find(conn).await?;
        Ok(page)
    }

    pub async fn select_page(
        &self,
        conn: &impl GenericClient,
        current: i64,
        size: i64,
        wrapper: &QueryWrapper<T>,
    ) -> OrmResult<Page<T>> {
        self.page(conn, Page::new(current, size), wrapper).await
    }

    pub async fn count(&self, conn: &impl GenericClient, wrapper: &QueryWrapper<T>) -> OrmResult<i64> {
        wrapper.apply(self.scope())?.count(conn).await
    }

    pub async fn insert(&self, conn: &impl GenericClient, wrapper: &InsertWrapper<T>) -> OrmResult<u64> {
        wrapper.apply(self.scope())?.create(conn).await
    }

    pub async fn delete(&self, conn: &impl GenericClient, wrapper: &DeleteWrapper<T>) -> OrmResult<u64> {
        wrapper.apply(self.scope())?.delete(conn).await
    }

    pub async fn update(&self, conn: &impl GenericClient, wrapper: &UpdateWrapper<T>) -> OrmResult<u64> {
        wrapper.apply(self.scope())?.updates(conn).await
    }
}

/// Paged query with default settings.
pub async fn select_page<T: Entity>(
    conn: &impl GenericClient,
    current: i64,
    size: i64,
    wrapper: &QueryWrapper<T>,
) -> OrmResult<Page<T>> {
    Service::<T>::default().select_page(conn, current, size, wrapper).await
}

/// List query with default settings.
pub async fn select_list<T: Entity>(
    conn: &impl GenericClient,
    wrapper: &QueryWrapper<T>,
) -> OrmResult<Vec<T>> {
    Service::<T>::default().list(conn, wrapper).await
}

/// Single-row query with default settings.
pub async fn select_one<T: Entity>(conn: &impl GenericClient, wrapper: &QueryWrapper<T>) -> OrmResult<T> {
    Service::<T>::default().get_one(conn, wrapper).await
}
