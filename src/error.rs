use std::ffi::c_int;

use thiserror::Error;

use crate::sqlite::ffi::code_description;

#[derive(Debug, Error)]
pub enum SqliteDriverError {
    #[error("sqlite3_open_v2 failed with code {code}: {}", code_description(.code))]
    Open { code: c_int },

    #[error("sqlite3_prepare_v2 failed with code {code}: {}", code_description(.code))]
    Prepare { code: c_int },

    #[error("sql params count invalid, expected: {expected}, actual: {actual}")]
    BindArity { expected: usize, actual: usize },

    #[error("binding parameter {index} failed with code {code}: {}", code_description(.code))]
    BindType { index: usize, code: c_int },

    #[error("sqlite3_step failed with code {code}: {}", code_description(.code))]
    Step { code: c_int },

    #[error("sqlite3_finalize failed with code {code}: {}", code_description(.code))]
    Finalize { code: c_int },

    #[error("sqlite3_close failed with code {code}: {}", code_description(.code))]
    Close { code: c_int },

    #[error("unexpected sqlite3 column type {0}")]
    UnknownColumnType(c_int),

    #[error("Unimplemented feature: {0}")]
    NotImplemented(String),

    /// Normal end of a row cursor. Not a fault; loops stop on it.
    #[error("no more rows")]
    EndOfData,

    #[error("Driver misuse: {0}")]
    Misuse(String),

    #[error("sql: unknown driver {0:?} (forgotten register?)")]
    UnknownDriver(String),

    #[error("sql: register called twice for driver {0:?}")]
    DuplicateDriver(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Value conversion error: {0}")]
    ConversionError(String),
}

impl SqliteDriverError {
    /// True for the end-of-rows sentinel returned by a cursor.
    #[must_use]
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, Self::EndOfData)
    }

    /// The native status code carried by this error, if any.
    #[must_use]
    pub fn native_code(&self) -> Option<c_int> {
        match self {
            Self::Open { code }
            | Self::Prepare { code }
            | Self::BindType { code, .. }
            | Self::Step { code }
            | Self::Finalize { code }
            | Self::Close { code } => Some(*code),
            Self::UnknownColumnType(tag) => Some(*tag),
            _ => None,
        }
    }
}
