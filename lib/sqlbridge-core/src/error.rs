///
/// Error taxonomy for every fallible boundary operation.
///
/// `SqlError::status` is the single place where a failure becomes an
/// integer status. Structured engine faults keep their own code; the
/// remaining variants map onto the fixed categories in `status`.
///

use thiserror::Error;

use crate::status::{self, Status};
use crate::types::Type;

pub type Result<T> = std::result::Result<T, SqlError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SqlError {
    /// Fault raised by the engine with its own status code.
    #[error("engine fault {code} ({}): {message}", status::status_name(*code))]
    Fault { code: Status, message: String },

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("invalid type cast: expected {expected}, found {found}")]
    InvalidTypeCast { expected: Type, found: Type },

    #[error("type mismatch: cannot read {requested} from {found} value")]
    TypeMismatch { requested: &'static str, found: Type },

    #[error("index {index} out of bounds for length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("stale handle: {0}")]
    StaleHandle(String),

    #[error("value {value:#x} is not owned by allocator {allocator}")]
    ForeignRelease { value: u64, allocator: u64 },
}

impl SqlError {
    pub fn fault(code: Status, message: impl Into<String>) -> Self {
        SqlError::Fault {
            code,
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        SqlError::Runtime(message.into())
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        SqlError::InvalidOperation(message.into())
    }

    pub fn status(&self) -> Status {
        match self {
            SqlError::Fault { code, .. } => *code,
            SqlError::Runtime(_) => status::RUNTIME_ERROR,
            SqlError::InvalidOperation(_) | SqlError::ForeignRelease { .. } => {
                status::INVALID_OPERATION
            }
            SqlError::InvalidTypeCast { .. } | SqlError::TypeMismatch { .. } => {
                status::INVALID_TYPE_CAST
            }
            SqlError::OutOfRange { .. } => status::INDEX_OUT_OF_BOUNDS,
            SqlError::StaleHandle(_) => status::SQL_NULL_REFERENCE,
        }
    }
}

/// Collapse a result into the status a boundary call reports.
pub fn status_of<T>(result: &Result<T>) -> Status {
    match result {
        Ok(_) => status::SQL_OK,
        Err(e) => e.status(),
    }
}
