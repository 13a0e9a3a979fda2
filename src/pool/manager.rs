use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};

static MEMORY_DB_SEQ: AtomicU64 = AtomicU64::new(0);

/// bb8 connection manager that opens `rusqlite` connections to one database.
#[derive(Debug, Clone)]
pub struct SqliteManager {
    path: String,
    flags: OpenFlags,
    busy_timeout: Duration,
    // Keeps a shared in-memory database alive while the pool recycles connections.
    _anchor: Option<Arc<Mutex<Connection>>>,
}

impl SqliteManager {
    #[must_use]
    pub fn new(path: impl Into<String>, busy_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            flags: OpenFlags::default(),
            busy_timeout,
            _anchor: None,
        }
    }

    /// Manager for an in-memory database that every pooled connection shares.
    ///
    /// A bare `:memory:` path is rewritten to a named shared-cache URI unique to
    /// this manager; other in-memory URIs are used as given.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the anchor connection cannot be opened.
    pub fn shared_memory(path: &str, busy_timeout: Duration) -> rusqlite::Result<Self> {
        let path = if path == ":memory:" {
            format!(
                "file:sql-entity-access-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                MEMORY_DB_SEQ.fetch_add(1, Ordering::Relaxed)
            )
        } else {
            path.to_owned()
        };
        let mut manager = Self::new(path, busy_timeout);
        let anchor = manager.open()?;
        manager._anchor = Some(Arc::new(Mutex::new(anchor)));
        Ok(manager)
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open_with_flags(&self.path, self.flags)?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }
}

impl bb8::ManageConnection for SqliteManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        tracing::debug!(path = %self.path, "opening sqlite connection");
        self.open()
    }

    async fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error> {
        conn.query_row("SELECT 1", [], |_| Ok(()))
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}
