use std::fmt;

use bb8::PooledConnection;

use super::manager::SqliteManager;

pub(crate) type SqlitePooledConnection = PooledConnection<'static, SqliteManager>;

/// A pooled connection owned by exactly one unit of work.
///
/// The connection goes back to the pool on [`release`](ConnectionLease::release) or
/// when the lease is dropped, whichever happens first.
pub struct ConnectionLease {
    conn: Option<SqlitePooledConnection>,
}

impl ConnectionLease {
    pub(crate) fn new(conn: SqlitePooledConnection) -> Self {
        Self { conn: Some(conn) }
    }

    /// Borrow the underlying connection, or `None` once released.
    pub fn connection(&mut self) -> Option<&mut rusqlite::Connection> {
        self.conn.as_deref_mut()
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.conn.is_none()
    }

    /// Return the connection to the pool. Releasing twice is a no-op.
    pub fn release(&mut self) {
        if self.conn.take().is_some() {
            tracing::trace!("lease released");
        }
    }
}

impl Drop for ConnectionLease {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ConnectionLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionLease")
            .field("released", &self.is_released())
            .finish()
    }
}
