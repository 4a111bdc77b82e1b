//!
//! Runtime, Database, Transaction and Allocator Lifecycle
//!
//! Databases and transactions are registry handles. Each hands out a
//! borrowed allocator that the caller never destroys: the database
//! allocator lives until the database closes, a transaction allocator until
//! commit or rollback. Standalone allocators are created and destroyed by
//! the caller.
//!

use std::ffi::c_char;
use std::path::Path;

use sqlbridge_core::status::Status;
use sqlbridge_core::{AllocatorKind, Config, SqlError, TransactionMode, parse_config};
use sqlbridge_sqlite::SqliteEngine;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::guard::{guard, input_str, write_out};
use crate::registry::with_runtime;
use crate::value::allocator_id;

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber installed by the host wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

/// Load configuration from `config_path` (defaults when null), apply it and
/// install logging. Safe to call more than once; later calls only replace
/// the configuration.
///
/// # Safety
/// `config_path` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_runtime_init(config_path: *const c_char) -> Status {
    guard("runtime_init", || {
        let config = if config_path.is_null() {
            Config::default()
        } else {
            let path = unsafe { input_str(config_path) }?;
            parse_config(Path::new(path)).map_err(|e| SqlError::runtime(e.to_string()))?
        };
        init_logging(&config.logging.filter);
        info!(filter = %config.logging.filter, "sqlbridge runtime initialized");
        with_runtime(|rt| {
            rt.apply_config(config);
            Ok(())
        })
    })
}

/// # Safety
/// `path` must be a NUL-terminated string; `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_database_open(path: *const c_char, out: *mut u64) -> Status {
    guard("database_open", || {
        let path = unsafe { input_str(path) }?;
        let id = with_runtime(|rt| {
            let engine = SqliteEngine::open(Path::new(path), &rt.config)?;
            Ok(rt.open_database(engine))
        })?;
        unsafe { write_out(out, id) }
    })
}

/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_database_open_memory(out: *mut u64) -> Status {
    guard("database_open_memory", || {
        let id = with_runtime(|rt| {
            let engine = SqliteEngine::open_in_memory(&rt.config)?;
            Ok(rt.open_database(engine))
        })?;
        unsafe { write_out(out, id) }
    })
}

/// Rolls back an active transaction. Every value owned by the database or
/// transaction allocator becomes invalid.
#[unsafe(no_mangle)]
pub extern "C" fn sqlbridge_database_close(database: u64) -> Status {
    guard("database_close", || with_runtime(|rt| rt.close_database(database)))
}

/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_database_allocator(database: u64, out: *mut u64) -> Status {
    guard("database_allocator", || {
        let allocator = with_runtime(|rt| Ok(rt.database(database)?.allocator))?;
        unsafe { write_out(out, allocator.as_raw()) }
    })
}

/// Begin at priority 0.
///
/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_transaction_begin(
    database: u64,
    mode: i32,
    out: *mut u64,
) -> Status {
    unsafe { begin("transaction_begin", database, mode, 0, out) }
}

/// Begin with a scheduling priority. SQLite has a single writer and no
/// transaction scheduler, so the priority is kept with the transaction and
/// reported by `sqlbridge_transaction_priority` without changing lock order.
///
/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_transaction_begin_with_priority(
    database: u64,
    mode: i32,
    priority: i32,
    out: *mut u64,
) -> Status {
    unsafe { begin("transaction_begin_with_priority", database, mode, priority, out) }
}

unsafe fn begin(
    call: &'static str,
    database: u64,
    mode: i32,
    priority: i32,
    out: *mut u64,
) -> Status {
    guard(call, || {
        let mode = TransactionMode::from_raw(mode)?;
        let id = with_runtime(|rt| rt.begin(database, mode, priority))?;
        unsafe { write_out(out, id) }
    })
}

/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_transaction_priority(transaction: u64, out: *mut i32) -> Status {
    guard("transaction_priority", || {
        let priority = with_runtime(|rt| Ok(rt.transaction(transaction)?.priority))?;
        unsafe { write_out(out, priority) }
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn sqlbridge_transaction_commit(transaction: u64) -> Status {
    guard("transaction_commit", || with_runtime(|rt| rt.finish(transaction, true)))
}

#[unsafe(no_mangle)]
pub extern "C" fn sqlbridge_transaction_rollback(transaction: u64) -> Status {
    guard("transaction_rollback", || with_runtime(|rt| rt.finish(transaction, false)))
}

/// Borrowed allocator valid until the transaction ends.
///
/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_transaction_allocator(
    transaction: u64,
    out: *mut u64,
) -> Status {
    guard("transaction_allocator", || {
        let allocator = with_runtime(|rt| Ok(rt.transaction(transaction)?.allocator))?;
        unsafe { write_out(out, allocator.as_raw()) }
    })
}

/// # Safety
/// `out` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sqlbridge_allocator_create(out: *mut u64) -> Status {
    guard("allocator_create", || {
        if out.is_null() {
            return unsafe { write_out(out, 0) };
        }
        let id = with_runtime(|rt| Ok(rt.store.create_allocator(AllocatorKind::Standalone)))?;
        unsafe { write_out(out, id.as_raw()) }
    })
}

/// Destroys a standalone allocator and every value it still owns.
#[unsafe(no_mangle)]
pub extern "C" fn sqlbridge_allocator_destroy(allocator: u64) -> Status {
    guard("allocator_destroy", || {
        let id = allocator_id(allocator)?;
        let freed = with_runtime(|rt| rt.store.destroy_allocator(id))?;
        debug!(allocator, freed, "standalone allocator destroyed");
        Ok(())
    })
}
