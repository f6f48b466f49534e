// SQLite module - the driver implementation over the engine's C API
//
// This module is split into several sub-modules for better organization:
// - ffi: owned native handles and raw calls
// - config: open options and flags
// - params: value -> native bind conversion
// - query: native column -> value conversion
// - connection / statement / rows: the driver contract implementation
// - driver: the factory and its registration

pub mod config;
pub mod connection;
pub mod driver;
pub(crate) mod ffi;
pub mod params;
pub mod query;
pub mod rows;
pub mod statement;

// Re-export the public API
pub use config::{OpenFlags, SqliteOptions, SqliteOptionsBuilder};
pub use connection::SqliteConnection;
pub use driver::{DRIVER_NAME, SqliteDriver, register_driver};
pub use params::format_timestamp;
pub use query::build_result_set;
pub use rows::SqliteRows;
pub use statement::SqliteStatement;
