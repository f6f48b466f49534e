use std::fmt;

use crate::driver::{Conn, Stmt, Tx};
use crate::error::SqliteDriverError;

use super::config::SqliteOptions;
use super::ffi::{RawConnection, SQLITE_OK};
use super::statement::SqliteStatement;

/// One open `SQLite` database connection.
///
/// Statements borrow the connection, so it can only be closed once every
/// statement prepared from it is gone. Dropping it without [`close`]
/// still releases the native handle.
///
/// ```rust,compile_fail
/// use sqlite_driver::prelude::*;
///
/// let conn = SqliteDriver.open(":memory:").unwrap();
/// let stmt = conn.prepare("SELECT 1").unwrap();
/// conn.close().unwrap(); // `stmt` still borrows the connection
/// stmt.close().unwrap();
/// ```
///
/// [`close`]: SqliteConnection::close
pub struct SqliteConnection {
    raw: RawConnection,
    db_path: String,
}

impl SqliteConnection {
    /// Open a connection with explicit options.
    ///
    /// # Errors
    ///
    /// Returns `SqliteDriverError::ConfigError` for paths or VFS names with
    /// NUL bytes and `SqliteDriverError::Open` when the engine refuses.
    pub fn open(opts: &SqliteOptions) -> Result<Self, SqliteDriverError> {
        let path = opts.c_path()?;
        let vfs = opts.c_vfs()?;
        let flags = opts.open_flags();
        let raw = RawConnection::open(&path, flags.bits(), vfs.as_deref())
            .map_err(|code| SqliteDriverError::Open { code })?;
        tracing::debug!(db_path = %opts.db_path, flags = flags.bits(), "opened sqlite connection");
        Ok(Self {
            raw,
            db_path: opts.db_path.clone(),
        })
    }

    /// Compile one statement. Text after the first statement is ignored.
    ///
    /// # Errors
    ///
    /// Returns `SqliteDriverError::Prepare` with the engine's status code, or
    /// `SqliteDriverError::Misuse` when the text holds no statement at all.
    pub fn prepare(&self, query: &str) -> Result<SqliteStatement<'_>, SqliteDriverError> {
        let raw = self
            .raw
            .prepare(query)
            .map_err(|code| SqliteDriverError::Prepare { code })?
            .ok_or_else(|| {
                SqliteDriverError::Misuse(format!("query contains no SQL statement: {query:?}"))
            })?;
        tracing::debug!(sql = query, "prepared sqlite statement");
        Ok(SqliteStatement::new(self, raw))
    }

    /// Transactions are not supported by this driver.
    ///
    /// # Errors
    ///
    /// Always returns `SqliteDriverError::NotImplemented`.
    pub fn begin(&self) -> Result<(), SqliteDriverError> {
        Err(SqliteDriverError::NotImplemented("transactions".into()))
    }

    /// Rowid of the most recent successful insert on this connection.
    #[must_use]
    pub fn last_insert_rowid(&self) -> i64 {
        self.raw.last_insert_rowid()
    }

    /// Rows changed by the most recent completed statement on this connection.
    #[must_use]
    pub fn changes(&self) -> i64 {
        self.raw.changes()
    }

    #[must_use]
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Release the native handle.
    ///
    /// # Errors
    ///
    /// Returns `SqliteDriverError::Close` with the engine's status code. The
    /// handle is then released on drop instead.
    pub fn close(self) -> Result<(), SqliteDriverError> {
        let code = self.raw.close();
        if code != SQLITE_OK {
            return Err(SqliteDriverError::Close { code });
        }
        tracing::debug!(db_path = %self.db_path, "closed sqlite connection");
        Ok(())
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl Conn for SqliteConnection {
    fn prepare<'c>(&'c self, query: &str) -> Result<Box<dyn Stmt + 'c>, SqliteDriverError> {
        Ok(Box::new(SqliteConnection::prepare(self, query)?))
    }

    fn close(self: Box<Self>) -> Result<(), SqliteDriverError> {
        SqliteConnection::close(*self)
    }

    fn begin(&self) -> Result<Box<dyn Tx + '_>, SqliteDriverError> {
        Err(SqliteDriverError::NotImplemented("transactions".into()))
    }
}
