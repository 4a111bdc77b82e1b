//!
//! Boundary Guard
//!
//! Every exported function runs its body through `guard`, which turns the
//! body's `Result` into a status and any panic into RUNTIME_ERROR, so no
//! unwind ever crosses into foreign code. The message of the most recent
//! failure on the calling thread is kept for `sqlbridge_last_error_message`.
//!
//! Also holds the pointer helpers shared by the exported functions: null
//! out-parameters and null input buffers are reported as
//! SQL_NULL_REFERENCE rather than dereferenced.
//!

use std::any::Any;
use std::cell::RefCell;
use std::ffi::{CStr, c_char};
use std::panic::{self, AssertUnwindSafe};

use sqlbridge_core::status::{
    RUNTIME_ERROR, SQL_INVALID_OPERAND, SQL_NULL_REFERENCE, SQL_OK, Status, status_name,
};
use sqlbridge_core::{Result, SqlError};
use tracing::{debug, error};

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn set_last_error(message: String) {
    LAST_ERROR.with(|e| *e.borrow_mut() = Some(message));
}

pub(crate) fn guard(call: &'static str, f: impl FnOnce() -> Result<()>) -> Status {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => SQL_OK,
        Ok(Err(e)) => {
            let status = e.status();
            debug!(call, status = status_name(status), error = %e, "call failed");
            set_last_error(e.to_string());
            status
        }
        Err(payload) => {
            let message = panic_message(&*payload);
            error!(call, panic = %message, "panic caught at boundary");
            set_last_error(format!("panic: {message}"));
            RUNTIME_ERROR
        }
    }
}

fn null_pointer(what: &str) -> SqlError {
    SqlError::fault(SQL_NULL_REFERENCE, format!("{what} pointer is null"))
}

/// Store `value` through an out-parameter.
pub(crate) unsafe fn write_out<T>(out: *mut T, value: T) -> Result<()> {
    if out.is_null() {
        return Err(null_pointer("output"));
    }
    unsafe { out.write(value) };
    Ok(())
}

/// Store through an optional out-parameter; null means "not wanted".
pub(crate) unsafe fn write_opt<T>(out: *mut T, value: T) {
    if !out.is_null() {
        unsafe { out.write(value) };
    }
}

pub(crate) unsafe fn input_bytes<'a>(ptr: *const u8, len: usize) -> Result<&'a [u8]> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(null_pointer("input"));
    }
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

pub(crate) unsafe fn output_bytes<'a>(ptr: *mut u8, len: usize) -> Result<&'a mut [u8]> {
    if len == 0 {
        return Ok(&mut []);
    }
    if ptr.is_null() {
        return Err(null_pointer("buffer"));
    }
    Ok(unsafe { std::slice::from_raw_parts_mut(ptr, len) })
}

pub(crate) unsafe fn input_str<'a>(ptr: *const c_char) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(null_pointer("string"));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|e| SqlError::fault(SQL_INVALID_OPERAND, format!("string is not UTF-8: {e}")))
}

/// Copy the message of the last failed call on this thread into `buf` as a
/// NUL-terminated string, truncating to `cap - 1` bytes. Returns the full
/// message length, or 0 when no call has failed.
///
/// # Safety
/// `buf` must be null or valid for `cap` bytes of writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_last_error_message(buf: *mut c_char, cap: usize) -> usize {
    LAST_ERROR.with(|e| {
        let e = e.borrow();
        let Some(message) = e.as_deref() else {
            return 0;
        };
        if !buf.is_null() && cap > 0 {
            let n = message.len().min(cap - 1);
            unsafe {
                std::ptr::copy_nonoverlapping(message.as_ptr(), buf.cast::<u8>(), n);
                *buf.add(n) = 0;
            }
        }
        message.len()
    })
}
