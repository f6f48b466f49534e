use std::ffi::{CString, c_int};
use std::ops::BitOr;

use serde::Deserialize;

use crate::error::SqliteDriverError;

use super::ffi;

/// Flags passed to `sqlite3_open_v2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFlags(c_int);

impl OpenFlags {
    pub const READ_ONLY: Self = Self(ffi::SQLITE_OPEN_READONLY);
    pub const READ_WRITE: Self = Self(ffi::SQLITE_OPEN_READWRITE);
    pub const CREATE: Self = Self(ffi::SQLITE_OPEN_CREATE);
    pub const URI: Self = Self(ffi::SQLITE_OPEN_URI);

    #[must_use]
    pub fn bits(self) -> c_int {
        self.0
    }

    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for OpenFlags {
    /// Create the database if missing, open it read-write.
    fn default() -> Self {
        Self::CREATE | Self::READ_WRITE
    }
}

impl BitOr for OpenFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Options for opening a `SQLite` connection.
///
/// Deserializable so callers can keep them in a config file:
/// ```rust
/// use sqlite_driver::sqlite::SqliteOptions;
///
/// let opts: SqliteOptions = serde_json::from_str(r#"{"db_path": ":memory:"}"#).unwrap();
/// assert_eq!(opts.db_path, ":memory:");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteOptions {
    pub db_path: String,
    /// Let `file:` URIs through to the engine.
    #[serde(default)]
    pub uri: bool,
    #[serde(default)]
    pub read_only: bool,
    /// Name of a registered VFS; `None` uses the default one.
    #[serde(default)]
    pub vfs: Option<String>,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            uri: false,
            read_only: false,
            vfs: None,
        }
    }

    #[must_use]
    pub fn builder(db_path: impl Into<String>) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }

    /// Read-only connections never create the file.
    #[must_use]
    pub fn open_flags(&self) -> OpenFlags {
        let base = if self.read_only {
            OpenFlags::READ_ONLY
        } else {
            OpenFlags::default()
        };
        if self.uri { base | OpenFlags::URI } else { base }
    }

    pub(crate) fn c_path(&self) -> Result<CString, SqliteDriverError> {
        CString::new(self.db_path.as_str()).map_err(|e| {
            SqliteDriverError::ConfigError(format!("database path contains a NUL byte: {e}"))
        })
    }

    pub(crate) fn c_vfs(&self) -> Result<Option<CString>, SqliteDriverError> {
        self.vfs
            .as_deref()
            .map(|vfs| {
                CString::new(vfs).map_err(|e| {
                    SqliteDriverError::ConfigError(format!("vfs name contains a NUL byte: {e}"))
                })
            })
            .transpose()
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn uri(mut self, uri: bool) -> Self {
        self.opts.uri = uri;
        self
    }

    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.opts.read_only = read_only;
        self
    }

    #[must_use]
    pub fn vfs(mut self, vfs: impl Into<String>) -> Self {
        self.opts.vfs = Some(vfs.into());
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }
}
