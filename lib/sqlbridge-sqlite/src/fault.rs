///
/// Translation of SQLite failures into structured engine faults.
///
/// SQLite result codes collide with the boundary's status numbering, so
/// they are never passed through raw. Each primary code is mapped onto the
/// closest engine category; failures that do not come from SQLite itself
/// become generic runtime errors.
///

use rusqlite::ErrorCode;
use rusqlite::ffi;
use sqlbridge_core::SqlError;
use sqlbridge_core::status::*;

pub(crate) fn fault(e: rusqlite::Error) -> SqlError {
    match e.sqlite_error() {
        Some(err) => {
            let code = match err.code {
                ErrorCode::ConstraintViolation => match err.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => NOT_UNIQUE,
                    _ => SQL_CONFLICT,
                },
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => SQL_CONFLICT,
                ErrorCode::OutOfMemory => NOT_ENOUGH_MEMORY,
                ErrorCode::ParameterOutOfRange => INDEX_OUT_OF_BOUNDS,
                ErrorCode::TypeMismatch => INVALID_TYPE_CAST,
                ErrorCode::ReadOnly => SQL_INVALID_STATE,
                ErrorCode::TooBig => SQL_INVALID_OPERAND,
                _ => SQL_SYSTEM_ERROR,
            };
            SqlError::fault(code, e.to_string())
        }
        None => SqlError::runtime(e.to_string()),
    }
}

/// Failure while preparing a statement. A generic SQLite error at this
/// point means the text did not compile.
pub(crate) fn compile_fault(e: rusqlite::Error) -> SqlError {
    match e.sqlite_error_code() {
        Some(ErrorCode::Unknown) => SqlError::fault(COMPILE_ERROR, e.to_string()),
        _ => fault(e),
    }
}
