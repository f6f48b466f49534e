use std::fmt;

use crate::driver::{ExecResult, Rows, Stmt};
use crate::error::SqliteDriverError;
use crate::types::Value;

use super::connection::SqliteConnection;
use super::ffi::{RawStatement, SQLITE_DONE, SQLITE_OK};
use super::params::bind_all;
use super::rows::SqliteRows;

/// A prepared statement on a [`SqliteConnection`].
///
/// Reusable: every `exec`/`query` resets the statement and binds the full
/// argument list again. Not safe to share between callers; one cursor at a
/// time.
pub struct SqliteStatement<'c> {
    conn: &'c SqliteConnection,
    raw: RawStatement,
    num_input: usize,
    col_names: Vec<String>,
    col_decl_types: Vec<String>,
}

impl<'c> SqliteStatement<'c> {
    pub(crate) fn new(conn: &'c SqliteConnection, raw: RawStatement) -> Self {
        let num_input = usize::try_from(raw.parameter_count()).unwrap_or_default();
        Self {
            conn,
            raw,
            num_input,
            col_names: Vec::new(),
            col_decl_types: Vec::new(),
        }
    }

    /// Number of `?` placeholders in the statement.
    #[must_use]
    pub fn num_input(&self) -> usize {
        self.num_input
    }

    fn bind(&mut self, args: &[Value]) -> Result<(), SqliteDriverError> {
        // clears the previous run; its status was already reported by step
        self.raw.reset();
        bind_all(&self.raw, args)
    }

    /// Bind and run a statement that returns no rows.
    ///
    /// # Errors
    ///
    /// Bind errors, or `SqliteDriverError::Step` if the engine reports
    /// anything other than completion, a produced row included.
    pub fn exec(&mut self, args: &[Value]) -> Result<ExecResult, SqliteDriverError> {
        self.bind(args)?;

        let code = self.raw.step();
        if code != SQLITE_DONE {
            tracing::trace!(code, "exec step did not complete");
            return Err(SqliteDriverError::Step { code });
        }

        Ok(ExecResult::new(
            self.conn.last_insert_rowid(),
            self.conn.changes(),
        ))
    }

    /// Bind and return a cursor. Nothing is stepped until the cursor advances.
    ///
    /// # Errors
    ///
    /// `SqliteDriverError::BindArity` or `SqliteDriverError::BindType`.
    pub fn query(&mut self, args: &[Value]) -> Result<SqliteRows<'_>, SqliteDriverError> {
        self.bind(args)?;

        let col_n = self.raw.column_count();
        self.col_names = (0..col_n).map(|i| self.raw.column_name(i)).collect();
        self.col_decl_types = (0..col_n).map(|i| self.raw.column_decltype(i)).collect();

        Ok(SqliteRows::new(&self.raw, &self.col_names))
    }

    /// Column names cached by the last `query`.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.col_names
    }

    /// Declared column types cached by the last `query`; empty strings for
    /// expressions.
    #[must_use]
    pub fn column_decltypes(&self) -> &[String] {
        &self.col_decl_types
    }

    /// Finalize the native statement.
    ///
    /// # Errors
    ///
    /// Returns `SqliteDriverError::Finalize` with the engine's status code.
    /// The statement is released either way.
    pub fn close(self) -> Result<(), SqliteDriverError> {
        let code = self.raw.finalize();
        if code != SQLITE_OK {
            return Err(SqliteDriverError::Finalize { code });
        }
        tracing::debug!("finalized sqlite statement");
        Ok(())
    }
}

impl fmt::Debug for SqliteStatement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStatement")
            .field("num_input", &self.num_input)
            .field("columns", &self.col_names)
            .finish_non_exhaustive()
    }
}

impl Stmt for SqliteStatement<'_> {
    fn num_input(&self) -> usize {
        SqliteStatement::num_input(self)
    }

    fn exec(&mut self, args: &[Value]) -> Result<ExecResult, SqliteDriverError> {
        SqliteStatement::exec(self, args)
    }

    fn query<'s>(&'s mut self, args: &[Value]) -> Result<Box<dyn Rows + 's>, SqliteDriverError> {
        Ok(Box::new(SqliteStatement::query(self, args)?))
    }

    fn close(self: Box<Self>) -> Result<(), SqliteDriverError> {
        SqliteStatement::close(*self)
    }
}
