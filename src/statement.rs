//! Parameterized statement text for entity writes.
//!
//! Table and column names are spliced in verbatim from the entity type name and
//! the field map keys. They are not quoted, escaped or checked against the
//! entity's column list, so field map keys must never come from untrusted
//! input: a crafted key is an SQL injection. Values always travel as bound `?`
//! parameters.

use crate::error::EntityAccessError;
use crate::field_map::FieldMap;
use crate::types::RowValues;

/// A query and its parameters bundled together
///
/// `params` binds positionally to the `?` placeholders in `query`, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAndParams {
    /// The SQL query string
    pub query: String,
    /// The parameters to be bound to the query
    pub params: Vec<RowValues>,
}

impl QueryAndParams {
    /// Create a new `QueryAndParams` with the given query string and parameters
    pub fn new(query: impl Into<String>, params: Vec<RowValues>) -> Self {
        Self {
            query: query.into(),
            params,
        }
    }
}

/// `INSERT INTO <table> (c1, c2) VALUES (?, ?)` with the field values as parameters.
///
/// # Errors
/// Returns `EntityAccessError::Validation` if `fields` is empty.
pub fn insert(table: &str, fields: &FieldMap) -> Result<QueryAndParams, EntityAccessError> {
    if fields.is_empty() {
        return Err(EntityAccessError::Validation(format!(
            "can not insert entity {table}: field map is empty"
        )));
    }

    let columns = fields.columns().collect::<Vec<_>>().join(", ");
    let placeholders = vec!["?"; fields.len()].join(", ");
    let query = format!("INSERT INTO {table} ({columns}) VALUES ({placeholders})");

    Ok(QueryAndParams::new(query, fields.values().cloned().collect()))
}

/// `UPDATE <table> SET c1=?, c2=? WHERE id=?` with the field values then `id`.
///
/// # Errors
/// Returns `EntityAccessError::Validation` if `fields` is empty.
pub fn update(table: &str, id: i64, fields: &FieldMap) -> Result<QueryAndParams, EntityAccessError> {
    if fields.is_empty() {
        return Err(EntityAccessError::Validation(format!(
            "can not update entity {table}: field map is empty"
        )));
    }

    let assignments = fields
        .columns()
        .map(|column| format!("{column}=?"))
        .collect::<Vec<_>>()
        .join(", ");
    let query = format!("UPDATE {table} SET {assignments} WHERE id=?");

    let mut params: Vec<RowValues> = Vec::with_capacity(fields.len() + 1);
    params.extend(fields.values().cloned());
    params.push(RowValues::Int(id));

    Ok(QueryAndParams::new(query, params))
}

/// `DELETE FROM <table> WHERE id=?`.
#[must_use]
pub fn delete(table: &str, id: i64) -> QueryAndParams {
    QueryAndParams::new(
        format!("DELETE FROM {table} WHERE id=?"),
        vec![RowValues::Int(id)],
    )
}

/// Caller-written SELECT text, passed through untouched.
#[must_use]
pub fn select(sql: &str, params: &[RowValues]) -> QueryAndParams {
    QueryAndParams::new(sql, params.to_vec())
}
