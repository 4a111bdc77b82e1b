///
/// Value construction, inspection and release.
///
/// Values cross the boundary as `u64` handles. Null and Bool are shared
/// constants that need no allocator; every other constructor places the
/// value in the given allocator and the caller must release it exactly once
/// through that allocator.
///
/// Materializing accessors (`string_ref`, `binary`) fill a
/// `CValueRef` that names both the new value and the allocator that owns
/// it.
///

use std::ffi::c_void;
use std::panic;

use sqlbridge_core::status::{SQL_INVALID_OPERAND, Status};
use sqlbridge_core::{
    AllocatorId, Array, Blob, Numeric, Result, SqlError, Type, Value, ValueHandle, ValueRef,
};

use crate::guard::{guard, input_bytes, write_out};
use crate::registry::{Runtime, with_runtime};

/// (allocator, value) pair handed to foreign callers. Allocator 0 marks a
/// shared constant that needs no release.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CValueRef {
    pub allocator: u64,
    pub value: u64,
}

pub(crate) fn allocator_id(raw: u64) -> Result<AllocatorId> {
    AllocatorId::from_raw(raw)
        .ok_or_else(|| SqlError::StaleHandle("allocator handle is 0".into()))
}

/// Hand a reference to the caller, or release it again if there is nowhere
/// to put it.
pub(crate) unsafe fn publish(rt: &mut Runtime, r: ValueRef, out: *mut CValueRef) -> Result<()> {
    if out.is_null() {
        r.release(&mut rt.store)?;
        return unsafe { write_out(out, CValueRef::default()) };
    }
    let (allocator, value) = r.into_raw();
    let pair = CValueRef {
        allocator: allocator.map_or(0, AllocatorId::as_raw),
        value: value.as_raw(),
    };
    unsafe { write_out(out, pair) }
}

unsafe fn create(
    call: &'static str,
    allocator: u64,
    out: *mut u64,
    make: impl FnOnce() -> Result<Value>,
) -> Status {
    guard(call, || {
        if out.is_null() {
            return unsafe { write_out(out, 0) };
        }
        let allocator = allocator_id(allocator)?;
        let value = make()?;
        let handle = with_runtime(|rt| rt.store.alloc(allocator, value))?;
        unsafe { write_out(out, handle.as_raw()) }
    })
}

/// # Safety
/// `out` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_null(out: *mut u64) -> Status {
    guard("value_null", || unsafe { write_out(out, ValueHandle::NULL.as_raw()) })
}

/// # Safety
/// `out` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_bool(b: bool, out: *mut u64) -> Status {
    guard("value_bool", || unsafe {
        write_out(out, ValueHandle::boolean(b).as_raw())
    })
}

/// # Safety
/// `out` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_create_int(
    allocator: u64,
    v: i64,
    out: *mut u64,
) -> Status {
    unsafe { create("value_create_int", allocator, out, || Ok(Value::Int(v))) }
}

/// # Safety
/// `out` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_create_real(
    allocator: u64,
    v: f64,
    out: *mut u64,
) -> Status {
    unsafe { create("value_create_real", allocator, out, || Ok(Value::Real(v))) }
}

/// # Safety
/// `out` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_create_datetime(
    allocator: u64,
    ticks: u64,
    out: *mut u64,
) -> Status {
    unsafe {
        create("value_create_datetime", allocator, out, || {
            Ok(Value::DateTime(ticks))
        })
    }
}

/// # Safety
/// `out` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_create_numeric(
    allocator: u64,
    scaled: i64,
    precision: usize,
    out: *mut u64,
) -> Status {
    unsafe {
        create("value_create_numeric", allocator, out, || {
            let precision = u8::try_from(precision).map_err(|_| {
                SqlError::fault(
                    SQL_INVALID_OPERAND,
                    format!("numeric precision {precision} too large"),
                )
            })?;
            Ok(Value::Numeric(Numeric::new(scaled, precision)?))
        })
    }
}

/// Copies `len` bytes; they need not be NUL-terminated or UTF-8.
///
/// # Safety
/// `p` must be valid for `len` bytes of reads; `out` must be null or valid
/// for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_create_string(
    allocator: u64,
    p: *const u8,
    len: usize,
    out: *mut u64,
) -> Status {
    unsafe {
        create("value_create_string", allocator, out, || {
            Ok(Value::string(input_bytes(p, len)?))
        })
    }
}

/// # Safety
/// `p` must be valid for `len` bytes of reads; `out` must be null or valid
/// for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_create_binary(
    allocator: u64,
    p: *const u8,
    len: usize,
    out: *mut u64,
) -> Status {
    unsafe {
        create("value_create_binary", allocator, out, || {
            Ok(Value::binary(input_bytes(p, len)?))
        })
    }
}

/// Seekable blob over a copy of `len` bytes.
///
/// # Safety
/// `p` must be valid for `len` bytes of reads; `out` must be null or valid
/// for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_create_blob(
    allocator: u64,
    p: *const u8,
    len: usize,
    out: *mut u64,
) -> Status {
    unsafe {
        create("value_create_blob", allocator, out, || {
            let bytes = input_bytes(p, len)?;
            let segment = with_runtime(|rt| Ok(rt.config.blob.segment_size))?;
            Ok(Value::Blob(Blob::from_bytes(bytes, segment)))
        })
    }
}

/// Fixed-length array; plain element types start zeroed, others Null.
///
/// # Safety
/// `out` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_create_array(
    allocator: u64,
    elem_type: i32,
    size: usize,
    out: *mut u64,
) -> Status {
    unsafe {
        create("value_create_array", allocator, out, || {
            let elem_type = Type::from_raw(elem_type).ok_or_else(|| {
                SqlError::invalid_operation(format!("unknown type tag {elem_type}"))
            })?;
            Ok(Value::Array(Array::new(elem_type, size)?))
        })
    }
}

/// Release through the owning allocator. Constants are accepted and ignored.
#[unsafe(no_mangle)]
pub extern "C" fn sqlbridge_value_release(allocator: u64, value: u64) -> Status {
    guard("value_release", || {
        let allocator = allocator_id(allocator)?;
        with_runtime(|rt| rt.store.release(allocator, ValueHandle::from_raw(value)))
    })
}

fn read<T>(
    call: &'static str,
    value: u64,
    out: *mut T,
    f: impl FnOnce(&mut Runtime, ValueHandle) -> Result<T>,
) -> Status {
    guard(call, || {
        let v = with_runtime(|rt| f(rt, ValueHandle::from_raw(value)))?;
        unsafe { write_out(out, v) }
    })
}

/// # Safety
/// `out` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_type(value: u64, out: *mut i32) -> Status {
    read("value_type", value, out, |rt, v| {
        Ok(rt.store.get(v)?.value_type().as_raw())
    })
}

/// Byte length of strings and binaries, element count of arrays and
/// sequences, column count of records.
///
/// # Safety
/// `out` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_size(value: u64, out: *mut usize) -> Status {
    read("value_size", value, out, |rt, v| rt.store.value_size(v))
}

/// Cannot fail; a dead handle is not null.
#[unsafe(no_mangle)]
pub extern "C" fn sqlbridge_value_is_null(value: u64) -> bool {
    probe(value, Value::is_null)
}

/// Cannot fail; anything but Bool true or a non-zero Int is false.
#[unsafe(no_mangle)]
pub extern "C" fn sqlbridge_value_is_true(value: u64) -> bool {
    probe(value, Value::is_true)
}

fn probe(value: u64, test: fn(&Value) -> bool) -> bool {
    let handle = ValueHandle::from_raw(value);
    panic::catch_unwind(|| with_runtime(|rt| Ok(test(rt.store.get(handle)?))).unwrap_or(false))
        .unwrap_or(false)
}

/// # Safety
/// `out` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_int(value: u64, out: *mut i64) -> Status {
    read("value_int", value, out, |rt, v| rt.store.get(v)?.int_value())
}

/// # Safety
/// `out` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_real(value: u64, out: *mut f64) -> Status {
    read("value_real", value, out, |rt, v| rt.store.get(v)?.real_value())
}

/// # Safety
/// `out` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_datetime(value: u64, out: *mut u64) -> Status {
    read("value_datetime", value, out, |rt, v| {
        rt.store.get(v)?.datetime_value()
    })
}

/// Scaled integer and precision: 123.45 reads back as (12345, 2).
///
/// # Safety
/// Both out-pointers must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_numeric(
    value: u64,
    out_scaled: *mut i64,
    out_precision: *mut usize,
) -> Status {
    guard("value_numeric", || {
        let n = with_runtime(|rt| {
            rt.store.get(ValueHandle::from_raw(value))?.numeric_value()
        })?;
        unsafe {
            write_out(out_scaled, n.scaled())?;
            write_out(out_precision, n.precision() as usize)
        }
    })
}

/// String form of the value, materialized in `allocator`.
///
/// # Safety
/// `out` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_string_ref(
    value: u64,
    allocator: u64,
    out: *mut CValueRef,
) -> Status {
    guard("value_string_ref", || {
        let allocator = allocator_id(allocator)?;
        with_runtime(|rt| {
            let r = rt.store.string_ref(ValueHandle::from_raw(value), allocator)?;
            unsafe { publish(rt, r, out) }
        })
    })
}

/// Binary copy of a string, binary or seekable blob, materialized in
/// `allocator`.
///
/// # Safety
/// `out` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_binary(
    value: u64,
    allocator: u64,
    out: *mut CValueRef,
) -> Status {
    guard("value_binary", || {
        let allocator = allocator_id(allocator)?;
        with_runtime(|rt| {
            let r = rt.store.binary_ref(ValueHandle::from_raw(value), allocator)?;
            unsafe { publish(rt, r, out) }
        })
    })
}

/// Address of string/binary bytes or of a plain array body. Valid until the
/// value is released or modified.
///
/// # Safety
/// `out` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_value_ptr(value: u64, out: *mut *const c_void) -> Status {
    read("value_ptr", value, out, |rt, v| {
        Ok(rt.store.get(v)?.pointer()?.cast::<c_void>())
    })
}
