//!
//! Execution Bridge (C surface)
//!
//! Parameters are value handles owned by the caller and only borrowed for
//! the duration of the call. A query result set is a Sequence of Records
//! stored in the transaction allocator, or in the database allocator when
//! no transaction is given.
//!

use std::ffi::c_char;

use sqlbridge_core::bridge;
use sqlbridge_core::status::{SQL_NULL_REFERENCE, Status};
use sqlbridge_core::{Result, SqlError, ValueHandle};
use tracing::trace;

use crate::guard::{guard, input_str, write_opt};
use crate::registry::with_runtime;

unsafe fn params(params: *const u64, n: usize) -> Result<Vec<ValueHandle>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    if params.is_null() {
        return Err(SqlError::fault(SQL_NULL_REFERENCE, "parameter array pointer is null"));
    }
    let raw = unsafe { std::slice::from_raw_parts(params, n) };
    Ok(raw.iter().copied().map(ValueHandle::from_raw).collect())
}

/// Run a statement; the affected row count (rows produced, for a SELECT) is
/// written to `n_records` when it is not null.
///
/// # Safety
/// `sql` must be a NUL-terminated string, `params` valid for `n` reads,
/// `n_records` null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_statement_execute(
    database: u64,
    transaction: u64,
    sql: *const c_char,
    params: *const u64,
    n: usize,
    n_records: *mut i64,
) -> Status {
    guard("statement_execute", || {
        let sql = unsafe { input_str(sql) }?;
        let params = unsafe { self::params(params, n) }?;
        trace!(database, transaction, sql, "execute statement");
        let rows = with_runtime(|rt| {
            let (engine, store, _) = rt.target(database, transaction)?;
            bridge::execute_statement(engine, store, sql, &params)
        })?;
        unsafe { write_opt(n_records, rows) };
        Ok(())
    })
}

/// Run a query. The result sequence is written to `data_source`; when that
/// is null the result is released at once. Statements without a result set
/// write 0.
///
/// # Safety
/// `sql` must be a NUL-terminated string, `params` valid for `n` reads,
/// `data_source` null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_query_execute(
    database: u64,
    transaction: u64,
    sql: *const c_char,
    params: *const u64,
    n: usize,
    data_source: *mut u64,
) -> Status {
    guard("query_execute", || {
        let sql = unsafe { input_str(sql) }?;
        let params = unsafe { self::params(params, n) }?;
        trace!(database, transaction, sql, "execute query");
        let result = with_runtime(|rt| {
            let (engine, store, allocator) = rt.target(database, transaction)?;
            let result = bridge::execute_query(engine, store, allocator, sql, &params)?;
            match result {
                Some(seq) if data_source.is_null() => {
                    store.release(allocator, seq)?;
                    Ok(ValueHandle::NONE)
                }
                Some(seq) => Ok(seq),
                None => Ok(ValueHandle::NONE),
            }
        })?;
        unsafe { write_opt(data_source, result.as_raw()) };
        Ok(())
    })
}
