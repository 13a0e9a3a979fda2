//! Runs one statement on one leased connection.
//!
//! Every call walks `Idle -> LeaseAcquired -> StatementExecuting -> ResultMapped
//! -> LeaseReleased`. The lease is moved into the blocking worker and released
//! there on success and failure alike; if the worker panics the lease is
//! dropped during unwinding, which also returns it to the pool.

use rusqlite::Connection;
use rusqlite::types::Value;

use crate::entity::Entity;
use crate::error::EntityAccessError;
use crate::mapper;
use crate::pool::ConnectionManager;
use crate::results::DbRow;
use crate::sqlite::{Params, build_first_row, build_result_set, execute_dml};
use crate::statement::QueryAndParams;

/// Lifecycle phases of a single executor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    LeaseAcquired,
    StatementExecuting,
    ResultMapped,
    LeaseReleased,
}

fn enter(operation: &'static str, phase: Phase) {
    tracing::trace!(operation, ?phase, "executor phase");
}

/// Orchestrates lease, statement and mapping for the façade.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    manager: ConnectionManager,
}

impl QueryExecutor {
    #[must_use]
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    #[must_use]
    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }

    /// Lease a connection, run `work` on it off the async runtime, release the lease.
    ///
    /// # Errors
    /// Returns whatever `work` returns, `EntityAccessError::PoolExhausted` if no
    /// connection frees up in time, or `EntityAccessError::Worker` if the worker
    /// panics.
    pub async fn run<F, R>(
        &self,
        operation: &'static str,
        stmt: QueryAndParams,
        work: F,
    ) -> Result<R, EntityAccessError>
    where
        F: FnOnce(&Connection, &str, &[Value]) -> Result<R, EntityAccessError> + Send + 'static,
        R: Send + 'static,
    {
        enter(operation, Phase::Idle);
        let outcome = self.run_leased(operation, stmt, work).await;
        if let Err(err) = &outcome {
            tracing::error!(operation, error = %err, "{operation} failure");
        }
        outcome
    }

    async fn run_leased<F, R>(
        &self,
        operation: &'static str,
        stmt: QueryAndParams,
        work: F,
    ) -> Result<R, EntityAccessError>
    where
        F: FnOnce(&Connection, &str, &[Value]) -> Result<R, EntityAccessError> + Send + 'static,
        R: Send + 'static,
    {
        let mut lease = self.manager.acquire().await?;
        enter(operation, Phase::LeaseAcquired);
        tracing::debug!(operation, sql = %stmt.query, params = stmt.params.len(), "executing");

        let params = Params::convert(&stmt.params);
        tokio::task::spawn_blocking(move || {
            let outcome = match lease.connection() {
                Some(conn) => {
                    enter(operation, Phase::StatementExecuting);
                    work(conn, &stmt.query, params.as_values())
                }
                None => Err(EntityAccessError::Worker(
                    "lease released before use".into(),
                )),
            };
            lease.release();
            enter(operation, Phase::LeaseReleased);
            outcome
        })
        .await?
    }

    /// Run a SELECT and map every row into `T`.
    ///
    /// # Errors
    /// See [`run`](QueryExecutor::run); also `EntityAccessError::Mapping`.
    pub async fn query_entities<T: Entity>(
        &self,
        operation: &'static str,
        stmt: QueryAndParams,
    ) -> Result<Vec<T>, EntityAccessError> {
        self.run(operation, stmt, move |conn, sql, params| {
            let rs = build_result_set(conn, sql, params)
                .map_err(EntityAccessError::data_access(operation))?;
            let entities = mapper::map_entities::<T>(&rs)?;
            enter(operation, Phase::ResultMapped);
            Ok(entities)
        })
        .await
    }

    /// Run a SELECT and map at most the first row into `T`.
    ///
    /// # Errors
    /// See [`run`](QueryExecutor::run); also `EntityAccessError::Mapping`.
    pub async fn query_entity<T: Entity>(
        &self,
        operation: &'static str,
        stmt: QueryAndParams,
    ) -> Result<Option<T>, EntityAccessError> {
        self.run(operation, stmt, move |conn, sql, params| {
            let rs = build_first_row(conn, sql, params)
                .map_err(EntityAccessError::data_access(operation))?;
            let entity = mapper::map_first::<T>(&rs)?;
            enter(operation, Phase::ResultMapped);
            Ok(entity)
        })
        .await
    }

    /// Run a SELECT and return generic rows.
    ///
    /// # Errors
    /// See [`run`](QueryExecutor::run).
    pub async fn query_rows(
        &self,
        operation: &'static str,
        stmt: QueryAndParams,
    ) -> Result<Vec<DbRow>, EntityAccessError> {
        self.run(operation, stmt, move |conn, sql, params| {
            let rs = build_result_set(conn, sql, params)
                .map_err(EntityAccessError::data_access(operation))?;
            enter(operation, Phase::ResultMapped);
            Ok(mapper::map_rows(rs))
        })
        .await
    }

    /// Run a DML statement and return the affected row count.
    ///
    /// # Errors
    /// See [`run`](QueryExecutor::run).
    pub async fn update(
        &self,
        operation: &'static str,
        stmt: QueryAndParams,
    ) -> Result<usize, EntityAccessError> {
        self.run(operation, stmt, move |conn, sql, params| {
            let affected = execute_dml(conn, sql, params)
                .map_err(EntityAccessError::data_access(operation))?;
            enter(operation, Phase::ResultMapped);
            Ok(affected)
        })
        .await
    }
}
