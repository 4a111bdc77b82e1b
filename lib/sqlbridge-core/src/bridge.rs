//!
//! Execution Bridge
//!
//! Resolves parameter handles against the store, hands the SQL text to the
//! engine, and places any result set in the allocator of the current
//! transaction (or database). Parameters are borrowed for the duration of
//! the call only; the caller keeps ownership of them.
//!

use tracing::debug;

use crate::engine::Engine;
use crate::error::Result;
use crate::store::{AllocatorId, Store, ValueHandle};
use crate::value::Value;

fn resolve<'s>(store: &'s Store, params: &[ValueHandle]) -> Result<Vec<&'s Value>> {
    params.iter().map(|h| store.get(*h)).collect()
}

pub fn execute_statement(
    engine: &mut dyn Engine,
    store: &Store,
    sql: &str,
    params: &[ValueHandle],
) -> Result<i64> {
    let values = resolve(store, params)?;
    let rows = engine.execute_statement(sql, &values)?;
    debug!(rows, params = params.len(), "statement executed");
    Ok(rows)
}

/// Run a query and store its result set under `allocator`. `Ok(None)` when
/// the statement produced no result set.
pub fn execute_query(
    engine: &mut dyn Engine,
    store: &mut Store,
    allocator: AllocatorId,
    sql: &str,
    params: &[ValueHandle],
) -> Result<Option<ValueHandle>> {
    let values = resolve(store, params)?;
    let Some(result) = engine.execute_query(sql, &values)? else {
        debug!("query produced no result set");
        return Ok(None);
    };
    let handle = store.alloc(allocator, Value::Sequence(result))?;
    debug!(allocator = allocator.as_raw(), "query result stored");
    Ok(Some(handle))
}
