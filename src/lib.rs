//! Typed data access over a pooled `SQLite` connection.
//!
//! The crate turns entity types and ordered field maps into parameterized SQL,
//! runs each statement on its own pooled connection lease, and maps result rows
//! back into entities or generic rows. [`EntityAccess`] is the entry point.

pub mod access;
pub mod config;
pub mod entity;
pub mod error;
pub mod executor;
pub mod field_map;
pub mod mapper;
pub mod pool;
pub mod prelude;
pub mod results;
pub mod sqlite;
pub mod statement;
pub mod types;

pub use access::EntityAccess;
pub use config::{DataSourceConfig, PoolOptions};
pub use entity::{Entity, EntityDescriptor, FromRowValue};
pub use error::EntityAccessError;
pub use field_map::FieldMap;
pub use pool::{ConnectionLease, ConnectionManager, PoolStatus};
pub use results::{DbRow, ResultSet};
pub use statement::QueryAndParams;
pub use types::{Driver, RowValues};
