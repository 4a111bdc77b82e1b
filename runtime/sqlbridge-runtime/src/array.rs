///
/// Array access.
///
/// Every call first checks the value is an Array (INVALID_OPERATION
/// otherwise). Elements read with `get_at` are materialized in the array's
/// own allocator and returned as a `CValueRef`.
///

use sqlbridge_core::status::{SQL_INVALID_OPERAND, Status};
use sqlbridge_core::{SqlError, Type, ValueHandle};

use crate::guard::{guard, input_bytes, write_out};
use crate::registry::with_runtime;
use crate::value::{CValueRef, publish};

/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_array_is_plain(array: u64, out: *mut bool) -> Status {
    guard("array_is_plain", || {
        let plain = with_runtime(|rt| {
            Ok(rt.store.get(ValueHandle::from_raw(array))?.as_array()?.is_plain())
        })?;
        unsafe { write_out(out, plain) }
    })
}

/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_array_elem_type(array: u64, out: *mut i32) -> Status {
    guard("array_elem_type", || {
        let ty = with_runtime(|rt| {
            Ok(rt.store.get(ValueHandle::from_raw(array))?.as_array()?.elem_type())
        })?;
        unsafe { write_out(out, ty.as_raw()) }
    })
}

/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_array_allocator(array: u64, out: *mut u64) -> Status {
    guard("array_allocator", || {
        let allocator = with_runtime(|rt| {
            rt.store.allocator_of(ValueHandle::from_raw(array), Type::Array)
        })?;
        unsafe { write_out(out, allocator.as_raw()) }
    })
}

/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_array_get_at(
    array: u64,
    index: usize,
    out: *mut CValueRef,
) -> Status {
    guard("array_get_at", || {
        with_runtime(|rt| {
            let element = rt.store.array_get_at(ValueHandle::from_raw(array), index)?;
            unsafe { publish(rt, element, out) }
        })
    })
}

/// Stores a copy of `value`; the caller keeps ownership of `value`.
#[unsafe(no_mangle)]
pub extern "C" fn sqlbridge_array_set_at(array: u64, index: usize, value: u64) -> Status {
    guard("array_set_at", || {
        with_runtime(|rt| {
            rt.store
                .array_set_at(ValueHandle::from_raw(array), index, ValueHandle::from_raw(value))
        })
    })
}

/// Replace the whole body of a plain array with `count` elements in native
/// layout: 1 byte per Bool, 8 bytes per Int, Real or DateTime. `count` must
/// equal the array length; `body` is not read otherwise.
///
/// # Safety
/// `body` must be valid for `count` elements of the array's layout.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_array_set_body(
    array: u64,
    body: *const u8,
    count: usize,
) -> Status {
    guard("array_set_body", || {
        with_runtime(|rt| {
            let handle = ValueHandle::from_raw(array);
            let array = rt.store.get(handle)?.as_array()?;
            let Some(width) = array.elem_type().plain_width().filter(|_| array.is_plain()) else {
                return Err(SqlError::invalid_operation(
                    "set_body requires an array of plain elements",
                ));
            };
            let len = array.len();
            if count != len {
                return Err(SqlError::fault(
                    SQL_INVALID_OPERAND,
                    format!("array body of {count} elements does not match array length {len}"),
                ));
            }
            let bytes = unsafe { input_bytes(body, len * width) }?;
            rt.store.array_set_body(handle, bytes, count)
        })
    })
}
