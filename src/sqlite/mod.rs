// SQLite module - binds row values to rusqlite and reads rows back.
//
// - params: parameter conversion between `RowValues` and SQLite values
// - query: statement execution and result set extraction

pub mod params;
pub mod query;

pub use params::Params;
pub use query::{build_first_row, build_result_set, execute_dml};
