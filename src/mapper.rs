//! Row decoding: typed entities or generic rows.
//!
//! Which decoding runs is fixed by the caller's choice of function, never by
//! inspecting the rows.

use crate::entity::Entity;
use crate::error::EntityAccessError;
use crate::results::{DbRow, ResultSet};

/// Build one entity from a row.
///
/// Columns without a matching field are skipped; fields without a matching
/// column keep their `Default` value.
///
/// # Errors
/// Returns `EntityAccessError::Mapping` if a matched column does not convert.
pub fn map_entity_row<T: Entity>(row: &DbRow) -> Result<T, EntityAccessError> {
    let mut entity = T::default();
    for (column, value) in row.iter() {
        entity.assign(column, value)?;
    }
    Ok(entity)
}

/// Map every row into an entity, failing the whole batch on the first bad row.
///
/// # Errors
/// Returns `EntityAccessError::Mapping` if any row fails to convert.
pub fn map_entities<T: Entity>(result_set: &ResultSet) -> Result<Vec<T>, EntityAccessError> {
    result_set.results.iter().map(map_entity_row::<T>).collect()
}

/// Map the first row, if any. Later rows are ignored.
///
/// # Errors
/// Returns `EntityAccessError::Mapping` if the first row fails to convert.
pub fn map_first<T: Entity>(result_set: &ResultSet) -> Result<Option<T>, EntityAccessError> {
    result_set.results.first().map(map_entity_row::<T>).transpose()
}

/// Generic rows in driver order.
#[must_use]
pub fn map_rows(result_set: ResultSet) -> Vec<DbRow> {
    result_set.into_rows()
}
