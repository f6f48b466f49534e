//! Owned handles over the raw SQLite C API.
//!
//! Every raw pointer in the crate lives in this module. Callers get status
//! codes and owned Rust values back; turning codes into
//! [`SqliteDriverError`](crate::SqliteDriverError) happens one layer up.
#![allow(unsafe_code)]

use std::ffi::{CStr, c_char, c_int, c_void};
use std::ptr::{self, NonNull};

use rusqlite::ffi;

pub(crate) const SQLITE_OK: c_int = ffi::SQLITE_OK;
pub(crate) const SQLITE_ROW: c_int = ffi::SQLITE_ROW;
pub(crate) const SQLITE_DONE: c_int = ffi::SQLITE_DONE;
pub(crate) const SQLITE_TOOBIG: c_int = ffi::SQLITE_TOOBIG;

pub(crate) const SQLITE_INTEGER: c_int = ffi::SQLITE_INTEGER;
pub(crate) const SQLITE_FLOAT: c_int = ffi::SQLITE_FLOAT;
pub(crate) const SQLITE_TEXT: c_int = ffi::SQLITE_TEXT;
pub(crate) const SQLITE_BLOB: c_int = ffi::SQLITE_BLOB;
pub(crate) const SQLITE_NULL: c_int = ffi::SQLITE_NULL;

pub(crate) const SQLITE_OPEN_READONLY: c_int = ffi::SQLITE_OPEN_READONLY;
pub(crate) const SQLITE_OPEN_READWRITE: c_int = ffi::SQLITE_OPEN_READWRITE;
pub(crate) const SQLITE_OPEN_CREATE: c_int = ffi::SQLITE_OPEN_CREATE;
pub(crate) const SQLITE_OPEN_URI: c_int = ffi::SQLITE_OPEN_URI;

// Bound with SQLITE_STATIC, so it must outlive every statement.
static EMPTY_TEXT: &[u8; 1] = b"\0";

/// English description of a result code, as reported by `sqlite3_errstr`.
#[must_use]
pub fn code_description(code: &c_int) -> String {
    let msg = unsafe { ffi::sqlite3_errstr(*code) };
    if msg.is_null() {
        return String::from("unknown error");
    }
    unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
}

fn len_as_c_int(len: usize) -> Result<c_int, c_int> {
    c_int::try_from(len).map_err(|_| SQLITE_TOOBIG)
}

/// Exclusive owner of a `sqlite3*`.
///
/// Released by [`RawConnection::close`], or by `sqlite3_close_v2` on drop.
#[derive(Debug)]
pub(crate) struct RawConnection {
    db: NonNull<ffi::sqlite3>,
}

impl RawConnection {
    pub(crate) fn open(path: &CStr, flags: c_int, vfs: Option<&CStr>) -> Result<Self, c_int> {
        let mut db: *mut ffi::sqlite3 = ptr::null_mut();
        let vfs = vfs.map_or(ptr::null(), CStr::as_ptr);
        let rc = unsafe { ffi::sqlite3_open_v2(path.as_ptr(), &mut db, flags, vfs) };
        if rc != SQLITE_OK {
            // sqlite hands back a handle even when open fails
            if !db.is_null() {
                unsafe { ffi::sqlite3_close(db) };
            }
            return Err(rc);
        }
        NonNull::new(db)
            .map(|db| Self { db })
            .ok_or(ffi::SQLITE_NOMEM)
    }

    /// Returns `None` when the text holds no statement (empty, whitespace, comment).
    pub(crate) fn prepare(&self, query: &str) -> Result<Option<RawStatement>, c_int> {
        let len = len_as_c_int(query.len())?;
        let mut stmt: *mut ffi::sqlite3_stmt = ptr::null_mut();
        let mut tail: *const c_char = ptr::null();
        let rc = unsafe {
            ffi::sqlite3_prepare_v2(
                self.db.as_ptr(),
                query.as_ptr().cast::<c_char>(),
                len,
                &mut stmt,
                &mut tail,
            )
        };
        if rc != SQLITE_OK {
            return Err(rc);
        }
        Ok(NonNull::new(stmt).map(|stmt| RawStatement { stmt }))
    }

    pub(crate) fn last_insert_rowid(&self) -> i64 {
        unsafe { ffi::sqlite3_last_insert_rowid(self.db.as_ptr()) }
    }

    pub(crate) fn changes(&self) -> i64 {
        i64::from(unsafe { ffi::sqlite3_changes(self.db.as_ptr()) })
    }

    /// `sqlite3_close`. On failure the handle is still open and is released
    /// by the drop that follows.
    pub(crate) fn close(self) -> c_int {
        let rc = unsafe { ffi::sqlite3_close(self.db.as_ptr()) };
        if rc == SQLITE_OK {
            std::mem::forget(self);
        }
        rc
    }
}

impl Drop for RawConnection {
    fn drop(&mut self) {
        let rc = unsafe { ffi::sqlite3_close_v2(self.db.as_ptr()) };
        if rc != SQLITE_OK {
            tracing::warn!(code = rc, "sqlite3_close_v2 failed while dropping connection");
        }
    }
}

/// Exclusive owner of a `sqlite3_stmt*`.
///
/// Finalized by [`RawStatement::finalize`], or on drop.
#[derive(Debug)]
pub(crate) struct RawStatement {
    stmt: NonNull<ffi::sqlite3_stmt>,
}

impl RawStatement {
    fn as_ptr(&self) -> *mut ffi::sqlite3_stmt {
        self.stmt.as_ptr()
    }

    pub(crate) fn parameter_count(&self) -> c_int {
        unsafe { ffi::sqlite3_bind_parameter_count(self.as_ptr()) }
    }

    pub(crate) fn reset(&self) -> c_int {
        unsafe { ffi::sqlite3_reset(self.as_ptr()) }
    }

    pub(crate) fn bind_null(&self, index: c_int) -> c_int {
        unsafe { ffi::sqlite3_bind_null(self.as_ptr(), index) }
    }

    pub(crate) fn bind_int64(&self, index: c_int, value: i64) -> c_int {
        unsafe { ffi::sqlite3_bind_int64(self.as_ptr(), index, value) }
    }

    pub(crate) fn bind_double(&self, index: c_int, value: f64) -> c_int {
        unsafe { ffi::sqlite3_bind_double(self.as_ptr(), index, value) }
    }

    pub(crate) fn bind_int(&self, index: c_int, value: c_int) -> c_int {
        unsafe { ffi::sqlite3_bind_int(self.as_ptr(), index, value) }
    }

    /// Binds with `SQLITE_TRANSIENT`: sqlite copies the bytes before returning.
    pub(crate) fn bind_blob(&self, index: c_int, value: &[u8]) -> c_int {
        let len = match len_as_c_int(value.len()) {
            Ok(len) => len,
            Err(code) => return code,
        };
        unsafe {
            ffi::sqlite3_bind_blob(
                self.as_ptr(),
                index,
                value.as_ptr().cast::<c_void>(),
                len,
                ffi::SQLITE_TRANSIENT(),
            )
        }
    }

    /// Binds with `SQLITE_TRANSIENT`: sqlite copies the bytes before returning.
    pub(crate) fn bind_text(&self, index: c_int, value: &str) -> c_int {
        let len = match len_as_c_int(value.len()) {
            Ok(len) => len,
            Err(code) => return code,
        };
        unsafe {
            ffi::sqlite3_bind_text(
                self.as_ptr(),
                index,
                value.as_ptr().cast::<c_char>(),
                len,
                ffi::SQLITE_TRANSIENT(),
            )
        }
    }

    pub(crate) fn bind_empty_text(&self, index: c_int) -> c_int {
        unsafe {
            ffi::sqlite3_bind_text(
                self.as_ptr(),
                index,
                EMPTY_TEXT.as_ptr().cast::<c_char>(),
                0,
                ffi::SQLITE_STATIC(),
            )
        }
    }

    pub(crate) fn step(&self) -> c_int {
        unsafe { ffi::sqlite3_step(self.as_ptr()) }
    }

    pub(crate) fn column_count(&self) -> c_int {
        unsafe { ffi::sqlite3_column_count(self.as_ptr()) }
    }

    pub(crate) fn column_name(&self, col: c_int) -> String {
        let name = unsafe { ffi::sqlite3_column_name(self.as_ptr(), col) };
        owned_c_string(name)
    }

    /// Empty for expressions and other columns without a declared type.
    pub(crate) fn column_decltype(&self, col: c_int) -> String {
        let decl = unsafe { ffi::sqlite3_column_decltype(self.as_ptr(), col) };
        owned_c_string(decl)
    }

    /// Runtime type of the cell in the current row.
    pub(crate) fn column_type(&self, col: c_int) -> c_int {
        unsafe { ffi::sqlite3_column_type(self.as_ptr(), col) }
    }

    pub(crate) fn column_int64(&self, col: c_int) -> i64 {
        unsafe { ffi::sqlite3_column_int64(self.as_ptr(), col) }
    }

    pub(crate) fn column_double(&self, col: c_int) -> f64 {
        unsafe { ffi::sqlite3_column_double(self.as_ptr(), col) }
    }

    /// Copies the cell out as bytes. The engine's buffer only lives until the
    /// next step, reset or finalize, so the copy is required.
    pub(crate) fn column_bytes_copy(&self, col: c_int) -> Vec<u8> {
        let data = unsafe { ffi::sqlite3_column_blob(self.as_ptr(), col) };
        let len = unsafe { ffi::sqlite3_column_bytes(self.as_ptr(), col) };
        let Ok(len) = usize::try_from(len) else {
            return Vec::new();
        };
        if len == 0 || data.is_null() {
            return Vec::new();
        }
        unsafe { std::slice::from_raw_parts(data.cast::<u8>(), len) }.to_vec()
    }

    pub(crate) fn finalize(self) -> c_int {
        let rc = unsafe { ffi::sqlite3_finalize(self.as_ptr()) };
        // finalize always destroys the statement, whatever it reports
        std::mem::forget(self);
        rc
    }
}

impl Drop for RawStatement {
    fn drop(&mut self) {
        // a non-OK code here is the last step's failure; the statement is gone either way
        let rc = unsafe { ffi::sqlite3_finalize(self.as_ptr()) };
        if rc != SQLITE_OK {
            tracing::debug!(code = rc, "statement dropped after a failed step");
        }
    }
}

fn owned_c_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}
