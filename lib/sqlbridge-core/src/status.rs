///
/// Status codes returned across the C boundary.
///
/// The numbering is fixed by the engine and shared with foreign callers,
/// so the values here must never be renumbered. `SQL_OK` is the only
/// success code; everything else identifies a failure category.
///

/// Integer status carried by every boundary call.
pub type Status = i32;

pub const SQL_OK: Status = 0;
pub const NO_MORE_ELEMENTS: Status = 1;
pub const INVALID_TYPE_CAST: Status = 2;
pub const COMPILE_ERROR: Status = 3;
pub const NOT_SINGLE_VALUE: Status = 4;
pub const INVALID_OPERATION: Status = 5;
pub const INDEX_OUT_OF_BOUNDS: Status = 6;
pub const NOT_ENOUGH_MEMORY: Status = 7;
pub const NOT_UNIQUE: Status = 8;
pub const NOT_PREPARED: Status = 9;
pub const RUNTIME_ERROR: Status = 10;
pub const COMMUNICATION_ERROR: Status = 11;
pub const UPGRADE_NOT_POSSIBLE: Status = 12;
pub const SQL_CONFLICT: Status = 13;
pub const SQL_NULL_REFERENCE: Status = 14;
pub const SQL_INVALID_STATE: Status = 15;
pub const SQL_INVALID_OPERAND: Status = 16;
pub const SQL_NULL_VALUE: Status = 17;
pub const SQL_BAD_CSV_FORMAT: Status = 18;
pub const SQL_SYSTEM_ERROR: Status = 19;

/// Short symbolic name for a status, used in log lines.
pub fn status_name(status: Status) -> &'static str {
    match status {
        SQL_OK => "SQL_OK",
        NO_MORE_ELEMENTS => "NO_MORE_ELEMENTS",
        INVALID_TYPE_CAST => "INVALID_TYPE_CAST",
        COMPILE_ERROR => "COMPILE_ERROR",
        NOT_SINGLE_VALUE => "NOT_SINGLE_VALUE",
        INVALID_OPERATION => "INVALID_OPERATION",
        INDEX_OUT_OF_BOUNDS => "INDEX_OUT_OF_BOUNDS",
        NOT_ENOUGH_MEMORY => "NOT_ENOUGH_MEMORY",
        NOT_UNIQUE => "NOT_UNIQUE",
        NOT_PREPARED => "NOT_PREPARED",
        RUNTIME_ERROR => "RUNTIME_ERROR",
        COMMUNICATION_ERROR => "COMMUNICATION_ERROR",
        UPGRADE_NOT_POSSIBLE => "UPGRADE_NOT_POSSIBLE",
        SQL_CONFLICT => "SQL_CONFLICT",
        SQL_NULL_REFERENCE => "SQL_NULL_REFERENCE",
        SQL_INVALID_STATE => "SQL_INVALID_STATE",
        SQL_INVALID_OPERAND => "SQL_INVALID_OPERAND",
        SQL_NULL_VALUE => "SQL_NULL_VALUE",
        SQL_BAD_CSV_FORMAT => "SQL_BAD_CSV_FORMAT",
        SQL_SYSTEM_ERROR => "SQL_SYSTEM_ERROR",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let all = [
            SQL_OK,
            NO_MORE_ELEMENTS,
            INVALID_TYPE_CAST,
            COMPILE_ERROR,
            NOT_SINGLE_VALUE,
            INVALID_OPERATION,
            INDEX_OUT_OF_BOUNDS,
            NOT_ENOUGH_MEMORY,
            NOT_UNIQUE,
            NOT_PREPARED,
            RUNTIME_ERROR,
            COMMUNICATION_ERROR,
            UPGRADE_NOT_POSSIBLE,
            SQL_CONFLICT,
            SQL_NULL_REFERENCE,
            SQL_INVALID_STATE,
            SQL_INVALID_OPERAND,
            SQL_NULL_VALUE,
            SQL_BAD_CSV_FORMAT,
            SQL_SYSTEM_ERROR,
        ];
        for (i, code) in all.iter().enumerate() {
            assert_eq!(*code, i as Status);
            assert_ne!(status_name(*code), "UNKNOWN");
        }
        assert_eq!(status_name(99), "UNKNOWN");
    }
}
