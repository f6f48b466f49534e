use std::ffi::c_int;
use std::fmt::Write;

use chrono::{DateTime, Timelike, Utc};

use crate::error::SqliteDriverError;
use crate::types::Value;

use super::ffi::{RawStatement, SQLITE_OK, SQLITE_TOOBIG};

// Thread-local buffer for efficient timestamp formatting
thread_local! {
    static TIMESTAMP_BUF: std::cell::RefCell<String> = std::cell::RefCell::new(String::with_capacity(32));
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS[.fffffffff]`.
///
/// Trailing zeros of the fraction are trimmed, and the dot goes with them
/// when the fraction is zero.
pub fn write_timestamp(out: &mut String, ts: &DateTime<Utc>) {
    // writing into a String cannot fail
    let _ = write!(out, "{}", ts.format("%Y-%m-%d %H:%M:%S"));
    let nanos = ts.nanosecond() % 1_000_000_000;
    if nanos == 0 {
        return;
    }
    let mut frac = format!("{nanos:09}");
    while frac.ends_with('0') {
        frac.pop();
    }
    out.push('.');
    out.push_str(&frac);
}

#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    let mut out = String::with_capacity(29);
    write_timestamp(&mut out, ts);
    out
}

fn bind_str(stmt: &RawStatement, index: c_int, value: &str) -> c_int {
    if value.is_empty() {
        stmt.bind_empty_text(index)
    } else {
        stmt.bind_text(index, value)
    }
}

/// Bind one value at a 1-based position and return the native status.
pub(crate) fn bind_value(stmt: &RawStatement, index: c_int, value: &Value) -> c_int {
    match value {
        Value::Null => stmt.bind_null(index),
        Value::Int(i) => stmt.bind_int64(index, *i),
        Value::Float(f) => stmt.bind_double(index, *f),
        Value::Bool(b) => stmt.bind_int(index, c_int::from(*b)),
        Value::Blob(bytes) => stmt.bind_blob(index, bytes),
        Value::Text(s) => bind_str(stmt, index, s),
        Value::Timestamp(ts) => TIMESTAMP_BUF.with(|buf| {
            let mut borrow = buf.borrow_mut();
            borrow.clear();
            write_timestamp(&mut borrow, ts);
            bind_str(stmt, index, &borrow)
        }),
        Value::Json(jval) => bind_str(stmt, index, &jval.to_string()),
    }
}

/// Bind a full argument list, 1-indexed, in order.
///
/// The list must match the statement's parameter count exactly. The first
/// failing bind aborts; values bound before it stay bound.
///
/// # Errors
///
/// Returns `SqliteDriverError::BindArity` on a count mismatch and
/// `SqliteDriverError::BindType` when the engine rejects a value.
pub(crate) fn bind_all(stmt: &RawStatement, args: &[Value]) -> Result<(), SqliteDriverError> {
    let expected = usize::try_from(stmt.parameter_count()).unwrap_or_default();
    if args.len() != expected {
        return Err(SqliteDriverError::BindArity {
            expected,
            actual: args.len(),
        });
    }

    for (i, value) in args.iter().enumerate() {
        let index = i + 1;
        let code = match c_int::try_from(index) {
            Ok(pos) => bind_value(stmt, pos, value),
            Err(_) => SQLITE_TOOBIG,
        };
        if code != SQLITE_OK {
            return Err(SqliteDriverError::BindType { index, code });
        }
    }
    Ok(())
}
