use std::sync::{Arc, Once};

use crate::driver::{Conn, Driver};
use crate::error::SqliteDriverError;
use crate::registry;

use super::config::SqliteOptions;
use super::connection::SqliteConnection;

/// Name the `SQLite` driver registers under.
pub const DRIVER_NAME: &str = "sqlite3";

/// Stateless factory for [`SqliteConnection`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl SqliteDriver {
    /// Open `dsn` with the default flags: create if missing, read-write.
    ///
    /// # Errors
    ///
    /// Returns `SqliteDriverError::Open` with the engine's status code.
    pub fn open(&self, dsn: &str) -> Result<SqliteConnection, SqliteDriverError> {
        self.open_with(&SqliteOptions::new(dsn))
    }

    /// Open a connection with explicit options.
    ///
    /// # Errors
    ///
    /// See [`SqliteConnection::open`].
    pub fn open_with(&self, opts: &SqliteOptions) -> Result<SqliteConnection, SqliteDriverError> {
        SqliteConnection::open(opts)
    }
}

impl Driver for SqliteDriver {
    fn open(&self, name: &str) -> Result<Box<dyn Conn>, SqliteDriverError> {
        Ok(Box::new(SqliteDriver::open(self, name)?))
    }
}

static REGISTER: Once = Once::new();

/// Register [`SqliteDriver`] under [`DRIVER_NAME`]. Safe to call repeatedly;
/// only the first call touches the registry.
pub fn register_driver() {
    REGISTER.call_once(|| {
        if let Err(e) = registry::register(DRIVER_NAME, Arc::new(SqliteDriver)) {
            tracing::warn!(error = %e, "sqlite driver registration skipped");
        }
    });
}
