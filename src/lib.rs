//! A database driver adapter over the embedded `SQLite` C API.
//!
//! The crate exposes a small, pluggable driver contract ([`driver`]) and a
//! `SQLite` implementation of it ([`sqlite`]). Connections, statements and
//! cursors own their native handles; values cross the boundary as
//! [`Value`].
//!
//! ```rust
//! use sqlite_driver::prelude::*;
//!
//! # fn main() -> Result<(), SqliteDriverError> {
//! let conn = SqliteDriver.open(":memory:")?;
//! conn.prepare("CREATE TABLE users (name TEXT, age INTEGER)")?.exec(&[])?;
//!
//! let mut insert = conn.prepare("INSERT INTO users (name, age) VALUES (?, ?)")?;
//! insert.exec(&[Value::from("alice"), Value::from(42_i64)])?;
//! insert.close()?;
//!
//! let mut select = conn.prepare("SELECT name, age FROM users")?;
//! let rs = build_result_set(&mut select, &[])?;
//! assert_eq!(rs.results[0].try_get::<String>("name")?, "alice");
//! select.close()?;
//! conn.close()?;
//! # Ok(())
//! # }
//! ```

pub mod conversion;
pub mod driver;
pub mod error;
pub mod prelude;
pub mod registry;
pub mod results;
pub mod sqlite;
pub mod types;

pub use error::SqliteDriverError;
pub use types::Value;
