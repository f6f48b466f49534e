use std::ffi::c_int;

use crate::error::SqliteDriverError;
use crate::results::ResultSet;
use crate::types::Value;

use super::ffi::{
    RawStatement, SQLITE_BLOB, SQLITE_FLOAT, SQLITE_INTEGER, SQLITE_NULL, SQLITE_TEXT,
};
use super::statement::SqliteStatement;

/// Decode the cell at `col` of the current row by its runtime type.
///
/// Types are per cell, not per column: the same column may yield an
/// integer in one row and text in the next.
///
/// # Errors
///
/// Returns `SqliteDriverError::UnknownColumnType` for a type tag outside the
/// five storage classes.
pub(crate) fn extract_value(stmt: &RawStatement, col: c_int) -> Result<Value, SqliteDriverError> {
    match stmt.column_type(col) {
        SQLITE_NULL => Ok(Value::Null),
        SQLITE_FLOAT => Ok(Value::Float(stmt.column_double(col))),
        SQLITE_INTEGER => Ok(Value::Int(stmt.column_int64(col))),
        SQLITE_TEXT | SQLITE_BLOB => Ok(Value::Blob(stmt.column_bytes_copy(col))),
        other => Err(SqliteDriverError::UnknownColumnType(other)),
    }
}

/// Decode a whole row into `dest`, one slot per column.
pub(crate) fn extract_row(stmt: &RawStatement, dest: &mut [Value]) -> Result<(), SqliteDriverError> {
    for (col, slot) in (0..).zip(dest.iter_mut()) {
        *slot = extract_value(stmt, col)?;
    }
    Ok(())
}

/// Run a prepared statement as a query and drain every row into a [`ResultSet`].
///
/// # Errors
///
/// Returns the bind error, or the first step/decode error hit while
/// iterating. `EndOfData` ends the loop and is not returned.
pub fn build_result_set(
    stmt: &mut SqliteStatement<'_>,
    args: &[Value],
) -> Result<ResultSet, SqliteDriverError> {
    let mut rows = stmt.query(args)?;
    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(std::sync::Arc::new(rows.columns().to_vec()));

    let width = rows.columns().len();
    loop {
        let mut row_values = vec![Value::Null; width];
        match rows.next(&mut row_values) {
            Ok(()) => result_set.add_row_values(row_values),
            Err(SqliteDriverError::EndOfData) => break,
            Err(e) => return Err(e),
        }
    }

    Ok(result_set)
}
