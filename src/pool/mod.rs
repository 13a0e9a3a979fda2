//! Bounded connection pool and per-call leases.

pub mod lease;
pub mod manager;

use std::fmt;
use std::time::Instant;

use bb8::{Pool, RunError};

pub use lease::ConnectionLease;
pub use manager::SqliteManager;

use crate::config::DataSourceConfig;
use crate::error::EntityAccessError;
use crate::types::Driver;

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Open physical connections.
    pub connections: u32,
    /// Open connections not currently leased.
    pub idle: u32,
    /// Connections currently leased out.
    pub in_use: u32,
}

/// Owns the process-wide pool and hands out [`ConnectionLease`]s.
#[derive(Clone)]
pub struct ConnectionManager {
    pool: Pool<SqliteManager>,
    config: DataSourceConfig,
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("config", &self.config)
            .field("status", &self.status())
            .finish()
    }
}

impl ConnectionManager {
    /// Build the pool described by `config` and smoke-test one connection.
    ///
    /// # Errors
    /// Returns `EntityAccessError::Config` for invalid pool options and
    /// `EntityAccessError::DataAccess` if the database cannot be opened.
    pub async fn new(config: &DataSourceConfig) -> Result<Self, EntityAccessError> {
        config.pool.validate()?;
        let manager = match config.driver {
            Driver::Sqlite if config.is_in_memory() => {
                SqliteManager::shared_memory(config.database_path(), config.pool.busy_timeout())
                    .map_err(EntityAccessError::data_access("open in-memory database"))?
            }
            Driver::Sqlite => {
                SqliteManager::new(config.database_path(), config.pool.busy_timeout())
            }
        };
        if config.username.is_some() {
            tracing::debug!("sqlite ignores jdbc.username/jdbc.password");
        }

        let pool = Pool::builder()
            .max_size(config.pool.max_size)
            .min_idle(config.pool.min_idle)
            .connection_timeout(config.pool.acquire_timeout())
            .test_on_check_out(false)
            .build(manager)
            .await
            .map_err(EntityAccessError::data_access("create pool"))?;

        let this = Self {
            pool,
            config: config.clone(),
        };
        this.initialize().await?;

        tracing::info!(
            url = %config.url,
            max_size = config.pool.max_size,
            "connection pool ready"
        );
        Ok(this)
    }

    async fn initialize(&self) -> Result<(), EntityAccessError> {
        if self.config.is_in_memory() {
            return Ok(());
        }
        let mut lease = self.acquire().await?;
        tokio::task::spawn_blocking(move || {
            let conn = lease.connection().ok_or_else(|| {
                EntityAccessError::Worker("lease released before use".into())
            })?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })
            .map_err(EntityAccessError::data_access("initialize pool"))?;
            lease.release();
            Ok::<(), EntityAccessError>(())
        })
        .await?
    }

    /// Lease a connection, waiting up to the configured acquire timeout.
    ///
    /// # Errors
    /// Returns `EntityAccessError::PoolExhausted` on timeout, or
    /// `EntityAccessError::DataAccess` if a new connection cannot be opened.
    pub async fn acquire(&self) -> Result<ConnectionLease, EntityAccessError> {
        let started = Instant::now();
        match self.pool.get_owned().await {
            Ok(conn) => {
                tracing::trace!("lease acquired");
                Ok(ConnectionLease::new(conn))
            }
            Err(RunError::TimedOut) => {
                let waited = started.elapsed();
                tracing::warn!(?waited, "connection pool exhausted");
                Err(EntityAccessError::PoolExhausted { waited })
            }
            Err(RunError::User(source)) => Err(EntityAccessError::DataAccess {
                operation: "get connection",
                source,
            }),
        }
    }

    /// Return a lease to the pool. Releasing an already-released lease is a no-op.
    pub fn release(&self, lease: &mut ConnectionLease) {
        lease.release();
    }

    /// Current pool occupancy.
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        let state = self.pool.state();
        PoolStatus {
            connections: state.connections,
            idle: state.idle_connections,
            in_use: state.connections.saturating_sub(state.idle_connections),
        }
    }

    #[must_use]
    pub fn config(&self) -> &DataSourceConfig {
        &self.config
    }
}
