///
/// Sequence cursor.
///
/// `get_iterator` positions the cursor, `next` pulls one element at a time
/// and writes 0 once the sequence is exhausted, `reset` returns it to the
/// unstarted state. Elements land in the sequence's own allocator and must
/// be released there.
///

use sqlbridge_core::status::Status;
use sqlbridge_core::{Type, ValueHandle};

use crate::guard::{guard, write_out};
use crate::registry::with_runtime;

/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_seq_allocator(seq: u64, out: *mut u64) -> Status {
    guard("seq_allocator", || {
        let allocator = with_runtime(|rt| {
            rt.store.allocator_of(ValueHandle::from_raw(seq), Type::Sequence)
        })?;
        unsafe { write_out(out, allocator.as_raw()) }
    })
}

/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_seq_elem_type(seq: u64, out: *mut i32) -> Status {
    guard("seq_elem_type", || {
        let ty = with_runtime(|rt| rt.store.seq_elem_type(ValueHandle::from_raw(seq)))?;
        unsafe { write_out(out, ty.as_raw()) }
    })
}

/// Number of elements. A streaming sequence is buffered to count it, and
/// fails with NOT_ENOUGH_MEMORY beyond the configured limit.
///
/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_seq_count(seq: u64, out: *mut usize) -> Status {
    guard("seq_count", || {
        let n = with_runtime(|rt| rt.store.seq_count(ValueHandle::from_raw(seq)))?;
        unsafe { write_out(out, n) }
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn sqlbridge_seq_get_iterator(seq: u64) -> Status {
    guard("seq_get_iterator", || {
        with_runtime(|rt| rt.store.seq_get_iterator(ValueHandle::from_raw(seq)))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn sqlbridge_seq_reset(seq: u64) -> Status {
    guard("seq_reset", || with_runtime(|rt| rt.store.seq_reset(ValueHandle::from_raw(seq))))
}

/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_seq_next(seq: u64, out: *mut u64) -> Status {
    guard("seq_next", || {
        if out.is_null() {
            return unsafe { write_out(out, 0) };
        }
        let item = with_runtime(|rt| rt.store.seq_next(ValueHandle::from_raw(seq)))?;
        unsafe { write_out(out, item.as_raw()) }
    })
}
