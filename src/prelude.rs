//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types so callers can get
//! started with a single `use sql_entity_access::prelude::*;`.

pub use crate::access::EntityAccess;
pub use crate::config::{DataSourceConfig, PoolOptions};
pub use crate::entity;
pub use crate::entity::{Entity, FromRowValue};
pub use crate::error::EntityAccessError;
pub use crate::field_map::FieldMap;
pub use crate::pool::{ConnectionManager, PoolStatus};
pub use crate::results::{DbRow, ResultSet};
pub use crate::types::{Driver, RowValues};
