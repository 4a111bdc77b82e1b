///
/// sqlbridge Runtime Library
///
/// Flat C API over the sqlbridge core. Produces a static library
/// (libsqlbridge_runtime.a) and a shared library for foreign hosts; the
/// declarations live in include/sqlbridge.h.
///
/// Contains:
/// - Runtime init, databases, transactions, allocators (sqlbridge_database_open, ...)
/// - Value construction and extraction (sqlbridge_value_create_int, sqlbridge_value_int, ...)
/// - Array, sequence, blob and record access
/// - Statement and query execution (sqlbridge_statement_execute, sqlbridge_query_execute)
/// - Last-error reporting (sqlbridge_last_error_message)
///
/// Every function returns a status code; results come back through
/// out-parameters. Panics never cross the boundary.
///

mod array;
mod blob;
mod database;
mod execute;
mod guard;
mod record;
mod registry;
mod sequence;
mod value;

pub use array::*;
pub use blob::*;
pub use database::*;
pub use execute::*;
pub use guard::sqlbridge_last_error_message;
pub use record::*;
pub use sequence::*;
pub use value::*;

pub use sqlbridge_core::status;
