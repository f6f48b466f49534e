use crate::driver::Rows;
use crate::error::SqliteDriverError;
use crate::types::Value;

use super::ffi::{RawStatement, SQLITE_DONE, SQLITE_ROW};
use super::query::extract_row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    Ready,
    HasRow,
    Exhausted,
    Errored,
}

/// Cursor over the rows of one [`SqliteStatement::query`] call.
///
/// Holds the statement mutably borrowed; the statement cannot be closed,
/// re-bound or queried again until the cursor is dropped.
///
/// ```rust,compile_fail
/// use sqlite_driver::prelude::*;
///
/// let conn = SqliteDriver.open(":memory:").unwrap();
/// let mut stmt = conn.prepare("SELECT 1").unwrap();
/// let mut rows = stmt.query(&[]).unwrap();
/// stmt.close().unwrap(); // the cursor still borrows the statement
/// let mut dest = [Value::Null];
/// rows.next(&mut dest).unwrap();
/// ```
///
/// [`SqliteStatement::query`]: super::SqliteStatement::query
#[derive(Debug)]
pub struct SqliteRows<'s> {
    raw: &'s RawStatement,
    columns: &'s [String],
    state: CursorState,
}

impl<'s> SqliteRows<'s> {
    pub(crate) fn new(raw: &'s RawStatement, columns: &'s [String]) -> Self {
        Self {
            raw,
            columns,
            state: CursorState::Ready,
        }
    }

    /// Column names of the result, stable for the life of the cursor.
    #[must_use]
    pub fn columns(&self) -> &'s [String] {
        self.columns
    }

    /// Step once and decode the row into `dest`.
    ///
    /// # Errors
    ///
    /// - `SqliteDriverError::EndOfData` when there are no more rows, and on
    ///   every call after that.
    /// - `SqliteDriverError::Step` for any other engine status.
    /// - `SqliteDriverError::UnknownColumnType` for an unexpected type tag.
    /// - `SqliteDriverError::Misuse` if `dest` is narrower than the column
    ///   count, or the cursor already failed.
    pub fn next(&mut self, dest: &mut [Value]) -> Result<(), SqliteDriverError> {
        match self.state {
            CursorState::Exhausted => return Err(SqliteDriverError::EndOfData),
            CursorState::Errored => {
                return Err(SqliteDriverError::Misuse(
                    "row cursor used after it failed".into(),
                ));
            }
            CursorState::Ready | CursorState::HasRow => {}
        }

        let width = self.columns.len();
        if dest.len() < width {
            return Err(SqliteDriverError::Misuse(format!(
                "destination holds {} values, row has {width} columns",
                dest.len()
            )));
        }

        match self.raw.step() {
            SQLITE_DONE => {
                self.state = CursorState::Exhausted;
                Err(SqliteDriverError::EndOfData)
            }
            SQLITE_ROW => match extract_row(self.raw, &mut dest[..width]) {
                Ok(()) => {
                    self.state = CursorState::HasRow;
                    Ok(())
                }
                Err(e) => {
                    self.state = CursorState::Errored;
                    Err(e)
                }
            },
            code => {
                tracing::trace!(code, "row step failed");
                self.state = CursorState::Errored;
                Err(SqliteDriverError::Step { code })
            }
        }
    }

    /// No-op; the statement owns everything the cursor reads.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn close(self) -> Result<(), SqliteDriverError> {
        Ok(())
    }
}

impl Rows for SqliteRows<'_> {
    fn columns(&self) -> &[String] {
        self.columns
    }

    fn next(&mut self, dest: &mut [Value]) -> Result<(), SqliteDriverError> {
        SqliteRows::next(self, dest)
    }

    fn close(self: Box<Self>) -> Result<(), SqliteDriverError> {
        SqliteRows::close(*self)
    }
}
