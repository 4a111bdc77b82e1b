///
/// Blob cursor: `available`, `get` into a caller buffer, `reset` to a byte
/// position. Seeking a streaming blob fails with INVALID_OPERATION.
///

use sqlbridge_core::ValueHandle;
use sqlbridge_core::status::Status;

use crate::guard::{guard, output_bytes, write_out};
use crate::registry::with_runtime;

/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_blob_available(blob: u64, out: *mut usize) -> Status {
    guard("blob_available", || {
        let n = with_runtime(|rt| rt.store.blob_available(ValueHandle::from_raw(blob)))?;
        unsafe { write_out(out, n) }
    })
}

/// Read up to `size` bytes into `buf`; fewer only at the end of the stream.
///
/// # Safety
/// `buf` must be valid for `size` bytes of writes; `out` must be valid for
/// writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_blob_get(
    blob: u64,
    buf: *mut u8,
    size: usize,
    out: *mut usize,
) -> Status {
    guard("blob_get", || {
        let buf = unsafe { output_bytes(buf, size) }?;
        let n = with_runtime(|rt| rt.store.blob_get(ValueHandle::from_raw(blob), buf))?;
        unsafe { write_out(out, n) }
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn sqlbridge_blob_reset(blob: u64, position: u64) -> Status {
    guard("blob_reset", || {
        with_runtime(|rt| rt.store.blob_reset(ValueHandle::from_raw(blob), position))
    })
}
