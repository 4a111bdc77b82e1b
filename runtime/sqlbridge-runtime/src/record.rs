///
/// Record column access.
///
/// Column values are materialized in the record's allocator and handed out
/// as a `CValueRef`; Null and Bool columns come back as constants with
/// allocator 0. Column names are materialized in the caller's allocator.
///

use sqlbridge_core::status::Status;
use sqlbridge_core::{Type, ValueHandle};

use crate::guard::{guard, write_out};
use crate::registry::with_runtime;
use crate::value::{CValueRef, allocator_id, publish};

/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_record_allocator(record: u64, out: *mut u64) -> Status {
    guard("record_allocator", || {
        let allocator = with_runtime(|rt| {
            rt.store.allocator_of(ValueHandle::from_raw(record), Type::Struct)
        })?;
        unsafe { write_out(out, allocator.as_raw()) }
    })
}

/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_record_column_count(record: u64, out: *mut usize) -> Status {
    guard("record_column_count", || {
        let n = with_runtime(|rt| {
            Ok(rt.store.get(ValueHandle::from_raw(record))?.as_record()?.column_count())
        })?;
        unsafe { write_out(out, n) }
    })
}

/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_record_get_column_value_ref(
    record: u64,
    index: usize,
    out: *mut CValueRef,
) -> Status {
    guard("record_get_column_value_ref", || {
        with_runtime(|rt| {
            let column = rt.store.record_column(ValueHandle::from_raw(record), index)?;
            unsafe { publish(rt, column, out) }
        })
    })
}

/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_record_column_name(
    record: u64,
    index: usize,
    allocator: u64,
    out: *mut CValueRef,
) -> Status {
    guard("record_column_name", || {
        let allocator = allocator_id(allocator)?;
        with_runtime(|rt| {
            let name = rt
                .store
                .record_column_name(ValueHandle::from_raw(record), index, allocator)?;
            unsafe { publish(rt, name, out) }
        })
    })
}
