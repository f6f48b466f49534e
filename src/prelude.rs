//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::conversion::{FromValue, convert_value};
pub use crate::driver::{Conn, Driver, ExecResult, Rows, Stmt, Tx};
pub use crate::error::SqliteDriverError;
pub use crate::registry;
pub use crate::results::{ResultSet, Row};
pub use crate::sqlite::{
    DRIVER_NAME, SqliteConnection, SqliteDriver, SqliteOptions, SqliteRows, SqliteStatement,
    build_result_set, register_driver,
};
pub use crate::types::Value;
