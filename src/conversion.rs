//! Cell conversion utilities.
//!
//! Cursors hand back the engine's storage classes (`Null`, `Int`, `Float`,
//! `Blob`). [`FromValue`] turns those cells into the Rust type a caller
//! asks for, the way a scan into a typed destination would.

use chrono::{DateTime, Utc};

use crate::error::SqliteDriverError;
use crate::types::Value;

/// Convert a decoded cell into a concrete Rust type.
pub trait FromValue: Sized {
    /// # Errors
    ///
    /// Returns `SqliteDriverError::ConversionError` if the cell cannot be
    /// represented as `Self`.
    fn from_value(value: &Value) -> Result<Self, SqliteDriverError>;
}

fn mismatch(target: &str, value: &Value) -> SqliteDriverError {
    SqliteDriverError::ConversionError(format!("cannot convert {value:?} into {target}"))
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, SqliteDriverError> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, SqliteDriverError> {
        value.as_int().ok_or_else(|| mismatch("i64", value))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, SqliteDriverError> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|e| {
            SqliteDriverError::ConversionError(format!("{wide} does not fit in i32: {e}"))
        })
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, SqliteDriverError> {
        match value {
            Value::Float(f) => Ok(*f),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(i) => Ok(*i as f64),
            _ => Err(mismatch("f64", value)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, SqliteDriverError> {
        value.as_bool().ok_or_else(|| mismatch("bool", value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, SqliteDriverError> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            Value::Blob(bytes) => String::from_utf8(bytes.clone()).map_err(|e| {
                SqliteDriverError::ConversionError(format!("column is not valid UTF-8: {e}"))
            }),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            _ => Err(mismatch("String", value)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, SqliteDriverError> {
        value
            .as_blob()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| mismatch("Vec<u8>", value))
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Result<Self, SqliteDriverError> {
        value
            .as_timestamp()
            .ok_or_else(|| mismatch("DateTime<Utc>", value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, SqliteDriverError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

/// Convert a cell, naming the target type at the call site.
///
/// # Errors
///
/// See [`FromValue::from_value`].
pub fn convert_value<T: FromValue>(value: &Value) -> Result<T, SqliteDriverError> {
    T::from_value(value)
}
