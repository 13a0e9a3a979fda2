//! CRUD façade over the executor.
//!
//! Each method is one unit of work with its own connection lease. Boolean write
//! methods return `false` for an empty field map without touching the database
//! but raise every I/O failure, so "no rows affected" and "operation failed"
//! stay distinguishable.

use std::path::Path;

use tokio::sync::OnceCell;

use crate::config::DataSourceConfig;
use crate::entity::Entity;
use crate::error::EntityAccessError;
use crate::executor::QueryExecutor;
use crate::field_map::FieldMap;
use crate::pool::ConnectionManager;
use crate::results::DbRow;
use crate::statement::{self, QueryAndParams};
use crate::types::RowValues;

static GLOBAL: OnceCell<EntityAccess> = OnceCell::const_new();

/// Public CRUD surface.
///
/// ```rust,no_run
/// use sql_entity_access::prelude::*;
///
/// entity! {
///     #[derive(Debug)]
///     pub struct Customer {
///         pub id: i64,
///         pub name: String,
///         pub email: String,
///     }
/// }
///
/// # async fn demo() -> Result<(), EntityAccessError> {
/// let access = EntityAccess::from_config_file("config.properties").await?;
/// let created = access
///     .insert_entity::<Customer>(&FieldMap::new().with("name", "Alice"))
///     .await?;
/// let customers: Vec<Customer> = access
///     .query_entity_list("SELECT * FROM Customer", &[])
///     .await?;
/// # let _ = (created, customers);
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct EntityAccess {
    executor: QueryExecutor,
}

impl EntityAccess {
    #[must_use]
    pub fn new(manager: ConnectionManager) -> Self {
        Self {
            executor: QueryExecutor::new(manager),
        }
    }

    /// Build the pool from `config`.
    ///
    /// # Errors
    /// Returns `EntityAccessError` if the pool cannot be created.
    pub async fn from_config(config: &DataSourceConfig) -> Result<Self, EntityAccessError> {
        Ok(Self::new(ConnectionManager::new(config).await?))
    }

    /// Load a properties file and build the pool from it.
    ///
    /// # Errors
    /// Returns `EntityAccessError::Config` for unreadable or invalid configuration
    /// and `EntityAccessError::DataAccess` if the database cannot be opened.
    pub async fn from_config_file(path: impl AsRef<Path>) -> Result<Self, EntityAccessError> {
        let config = DataSourceConfig::load(path)?;
        Self::from_config(&config).await
    }

    /// Initialize the process-wide instance once; later calls return the first one.
    ///
    /// # Errors
    /// Returns `EntityAccessError` if the first initialization fails.
    pub async fn install(config: &DataSourceConfig) -> Result<&'static Self, EntityAccessError> {
        GLOBAL.get_or_try_init(|| Self::from_config(config)).await
    }

    /// The process-wide instance, if [`install`](EntityAccess::install) has run.
    #[must_use]
    pub fn global() -> Option<&'static Self> {
        GLOBAL.get()
    }

    #[must_use]
    pub fn connection_manager(&self) -> &ConnectionManager {
        self.executor.manager()
    }

    /// Run `sql` and map every row into `T`.
    ///
    /// # Errors
    /// Returns `EntityAccessError::DataAccess` on statement failure and
    /// `EntityAccessError::Mapping` if any row does not fit `T`.
    pub async fn query_entity_list<T: Entity>(
        &self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<Vec<T>, EntityAccessError> {
        self.executor
            .query_entities("query entity list", statement::select(sql, params))
            .await
    }

    /// Run `sql` and map the first row into `T`; `None` when no rows match.
    ///
    /// # Errors
    /// Same as [`query_entity_list`](EntityAccess::query_entity_list).
    pub async fn query_entity<T: Entity>(
        &self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<Option<T>, EntityAccessError> {
        self.executor
            .query_entity("query entity", statement::select(sql, params))
            .await
    }

    /// Run arbitrary SELECT text (joins included) and return generic rows.
    ///
    /// # Errors
    /// Returns `EntityAccessError::DataAccess` on statement failure.
    pub async fn execute_query(
        &self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<Vec<DbRow>, EntityAccessError> {
        self.executor
            .query_rows("execute query", statement::select(sql, params))
            .await
    }

    /// Run INSERT/UPDATE/DELETE text and return the affected row count.
    ///
    /// # Errors
    /// Returns `EntityAccessError::DataAccess` on statement failure.
    pub async fn execute_update(
        &self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<usize, EntityAccessError> {
        self.executor
            .update("execute update", QueryAndParams::new(sql, params.to_vec()))
            .await
    }

    /// Insert one `T` row built from `fields`.
    ///
    /// Returns `true` iff exactly one row was inserted, `false` for an empty map.
    ///
    /// # Errors
    /// Returns `EntityAccessError::DataAccess` on statement failure.
    pub async fn insert_entity<T: Entity>(
        &self,
        fields: &FieldMap,
    ) -> Result<bool, EntityAccessError> {
        let stmt = match statement::insert(T::TABLE, fields) {
            Ok(stmt) => stmt,
            Err(err) => {
                tracing::error!(error = %err, "can not insert entity");
                return Ok(false);
            }
        };
        Ok(self.executor.update("insert entity", stmt).await? == 1)
    }

    /// Update the `T` row with primary key `id` from `fields`.
    ///
    /// Returns `true` iff exactly one row was updated, `false` for an empty map.
    ///
    /// # Errors
    /// Returns `EntityAccessError::DataAccess` on statement failure.
    pub async fn update_entity<T: Entity>(
        &self,
        id: i64,
        fields: &FieldMap,
    ) -> Result<bool, EntityAccessError> {
        let stmt = match statement::update(T::TABLE, id, fields) {
            Ok(stmt) => stmt,
            Err(err) => {
                tracing::error!(error = %err, "can not update entity");
                return Ok(false);
            }
        };
        Ok(self.executor.update("update entity", stmt).await? == 1)
    }

    /// Delete the `T` row with primary key `id`; `false` if no such row.
    ///
    /// # Errors
    /// Returns `EntityAccessError::DataAccess` on statement failure.
    pub async fn delete_entity<T: Entity>(&self, id: i64) -> Result<bool, EntityAccessError> {
        Ok(self
            .executor
            .update("delete entity", statement::delete(T::TABLE, id))
            .await?
            == 1)
    }
}
