//! The pluggable driver contract.
//!
//! A driver is a factory for connections; a connection is a factory for
//! prepared statements; a statement either executes (yielding an
//! [`ExecResult`]) or queries (yielding a [`Rows`] cursor). Every call is
//! synchronous and returns once the engine does.
//!
//! Lifetimes carry the ownership rules: a statement borrows its connection
//! and a cursor borrows its statement mutably, so a connection cannot be
//! closed while statements are open and a statement cannot be closed or
//! re-run while a cursor is alive.

use serde::Serialize;

use crate::error::SqliteDriverError;
use crate::types::Value;

/// Factory for connections, registered under a name in [`crate::registry`].
pub trait Driver: Send + Sync {
    /// Open a connection to the data source `name`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteDriverError::Open` with the engine's status code.
    fn open(&self, name: &str) -> Result<Box<dyn Conn>, SqliteDriverError>;
}

/// A single connection to a database.
pub trait Conn {
    /// Compile `query` into a prepared statement.
    ///
    /// # Errors
    ///
    /// Returns `SqliteDriverError::Prepare` with the engine's status code.
    fn prepare<'c>(&'c self, query: &str) -> Result<Box<dyn Stmt + 'c>, SqliteDriverError>;

    /// Release the connection.
    ///
    /// # Errors
    ///
    /// Returns `SqliteDriverError::Close` with the engine's status code.
    fn close(self: Box<Self>) -> Result<(), SqliteDriverError>;

    /// Start a transaction.
    ///
    /// # Errors
    ///
    /// Drivers without transaction support return
    /// `SqliteDriverError::NotImplemented`.
    fn begin(&self) -> Result<Box<dyn Tx + '_>, SqliteDriverError>;
}

/// A transaction handle.
pub trait Tx {
    /// # Errors
    ///
    /// Returns the driver's error if the commit fails.
    fn commit(self: Box<Self>) -> Result<(), SqliteDriverError>;

    /// # Errors
    ///
    /// Returns the driver's error if the rollback fails.
    fn rollback(self: Box<Self>) -> Result<(), SqliteDriverError>;
}

/// A prepared statement.
pub trait Stmt {
    /// Number of placeholders; `exec`/`query` need exactly this many args.
    fn num_input(&self) -> usize;

    /// Run a statement that produces no rows.
    ///
    /// # Errors
    ///
    /// Bind errors, or `SqliteDriverError::Step` when the engine does not
    /// report completion.
    fn exec(&mut self, args: &[Value]) -> Result<ExecResult, SqliteDriverError>;

    /// Bind `args` and return a cursor over the rows.
    ///
    /// # Errors
    ///
    /// `SqliteDriverError::BindArity` or `SqliteDriverError::BindType`.
    fn query<'s>(&'s mut self, args: &[Value]) -> Result<Box<dyn Rows + 's>, SqliteDriverError>;

    /// Release the statement.
    ///
    /// # Errors
    ///
    /// Returns `SqliteDriverError::Finalize` with the engine's status code.
    fn close(self: Box<Self>) -> Result<(), SqliteDriverError>;
}

/// A cursor over query results.
pub trait Rows {
    /// Column names, in result order.
    fn columns(&self) -> &[String];

    /// Advance to the next row and decode it into `dest`.
    ///
    /// `dest` needs one slot per column.
    ///
    /// # Errors
    ///
    /// `SqliteDriverError::EndOfData` once the rows run out; callers stop
    /// on it rather than treating it as a failure. Any other variant is a
    /// real error.
    fn next(&mut self, dest: &mut [Value]) -> Result<(), SqliteDriverError>;

    /// Release cursor state.
    ///
    /// # Errors
    ///
    /// Driver specific.
    fn close(self: Box<Self>) -> Result<(), SqliteDriverError>;
}

/// Outcome of a statement run through [`Stmt::exec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecResult {
    last_insert_id: i64,
    rows_affected: i64,
}

impl ExecResult {
    #[must_use]
    pub fn new(last_insert_id: i64, rows_affected: i64) -> Self {
        Self {
            last_insert_id,
            rows_affected,
        }
    }

    /// Rowid of the most recent successful insert on the connection.
    #[must_use]
    pub fn last_insert_id(&self) -> i64 {
        self.last_insert_id
    }

    /// Rows changed by the statement.
    #[must_use]
    pub fn rows_affected(&self) -> i64 {
        self.rows_affected
    }
}
