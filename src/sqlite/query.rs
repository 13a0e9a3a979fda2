use std::sync::Arc;

use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};

use super::params::sqlite_value_to_row_value;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
///
/// Returns `rusqlite::Error` if the column cannot be read.
pub fn sqlite_extract_value_sync(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<RowValues> {
    let value: Value = row.get(idx)?;
    Ok(sqlite_value_to_row_value(value))
}

/// Run a query and collect every row into a [`ResultSet`].
///
/// # Errors
/// Returns `rusqlite::Error` if preparing, binding or stepping the statement fails.
pub fn build_result_set(
    conn: &Connection,
    query: &str,
    params: &[Value],
) -> rusqlite::Result<ResultSet> {
    collect_rows(conn, query, params, None)
}

/// Run a query and step it at most once; the result holds zero or one row.
///
/// # Errors
/// Returns `rusqlite::Error` if preparing, binding or stepping the statement fails.
pub fn build_first_row(
    conn: &Connection,
    query: &str,
    params: &[Value],
) -> rusqlite::Result<ResultSet> {
    collect_rows(conn, query, params, Some(1))
}

fn collect_rows(
    conn: &Connection,
    query: &str,
    params: &[Value],
    limit: Option<usize>,
) -> rusqlite::Result<ResultSet> {
    let mut stmt = conn.prepare(query)?;
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(limit.unwrap_or(10));
    result_set.set_column_names(Arc::new(column_names));

    let mut rows_iter = stmt.query(params_from_iter(params.iter()))?;
    while limit.is_none_or(|max| result_set.len() < max) {
        let Some(row) = rows_iter.next()? else {
            break;
        };
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(sqlite_extract_value_sync(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Execute a DML statement and return the affected row count.
///
/// # Errors
/// Returns `rusqlite::Error` if preparing or executing the statement fails.
pub fn execute_dml(conn: &Connection, query: &str, params: &[Value]) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(query)?;
    stmt.execute(params_from_iter(params.iter()))
}
