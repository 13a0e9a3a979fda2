use std::time::Duration;

use thiserror::Error;

/// Errors raised by the data-access layer.
///
/// Every variant that can escape the executor is raised only after the
/// connection lease for the call has been returned to the pool.
#[derive(Debug, Error)]
pub enum EntityAccessError {
    /// No pooled connection became available within the acquire timeout.
    #[error("connection pool exhausted after waiting {waited:?}")]
    PoolExhausted { waited: Duration },

    /// Caller input rejected before any SQL was built.
    #[error("validation error: {0}")]
    Validation(String),

    /// Statement or connection failure reported by the driver.
    #[error("{operation} failure: {source}")]
    DataAccess {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// A column value could not be converted into the entity field type.
    #[error("cannot map column `{column}` of `{table}` into {expected}: found {found}")]
    Mapping {
        table: &'static str,
        column: String,
        expected: &'static str,
        found: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    /// The blocking worker running the statement panicked or was cancelled.
    #[error("worker error: {0}")]
    Worker(String),
}

impl EntityAccessError {
    pub(crate) fn data_access(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| EntityAccessError::DataAccess { operation, source }
    }

    /// True for failures raised before any SQL reached the database.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, EntityAccessError::Validation(_))
    }
}

impl From<tokio::task::JoinError> for EntityAccessError {
    fn from(err: tokio::task::JoinError) -> Self {
        EntityAccessError::Worker(format!("blocking task failed: {err}"))
    }
}
