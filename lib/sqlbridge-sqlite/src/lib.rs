///
/// SQLite engine for sqlbridge.
///
/// Implements the core `Engine` trait on top of rusqlite with bundled
/// SQLite. Query results are fully materialized, so the returned sequence
/// is reproducible and can be counted and reset freely.
///

mod convert;
mod database;
mod fault;

pub use convert::{DeclaredType, parse_decl_type};
pub use database::SqliteEngine;
