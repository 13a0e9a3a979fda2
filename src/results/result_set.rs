use std::collections::HashMap;
use std::sync::Arc;

use super::row::{DbRow, column_index};
use crate::types::RowValues;

/// A result set from a database query
///
/// Holds the rows returned by a SELECT in driver order. Column names and the
/// name-to-index cache are shared by every row.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<DbRow>,
    /// Column names shared by all rows (to avoid duplicating in each row)
    column_names: Option<Arc<Vec<String>>>,
    column_index_cache: Option<Arc<HashMap<String, usize>>>,
}

impl ResultSet {
    /// Create a new result set with a known capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            column_names: None,
            column_index_cache: None,
        }
    }

    /// Set the column names for this result set (to be shared by all rows)
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_index_cache = Some(Arc::new(column_index(&column_names)));
        self.column_names = Some(column_names);
    }

    /// Add a row to the result set
    ///
    /// Rows added before the column names are set are dropped.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        if let (Some(names), Some(cache)) = (&self.column_names, &self.column_index_cache) {
            self.results.push(DbRow::with_cache(
                Arc::clone(names),
                Arc::clone(cache),
                row_values,
            ));
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<DbRow> {
        self.results
    }
}
