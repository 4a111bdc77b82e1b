///
/// Engine seam.
///
/// The boundary never executes SQL itself. An `Engine` compiles and runs
/// statements, binds parameters, and produces result sets as sequences of
/// records. Transaction control lives here too, because only the engine
/// knows what a transaction means for its storage.
///

use crate::error::{Result, SqlError};
use crate::sequence::Sequence;
use crate::value::Value;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    ReadOnly = 0,
    Update = 1,
    ReadWrite = 2,
    Exclusive = 3,
}

impl TransactionMode {
    pub fn from_raw(raw: i32) -> Result<Self> {
        match raw {
            0 => Ok(TransactionMode::ReadOnly),
            1 => Ok(TransactionMode::Update),
            2 => Ok(TransactionMode::ReadWrite),
            3 => Ok(TransactionMode::Exclusive),
            other => Err(SqlError::invalid_operation(format!(
                "unknown transaction mode {other}"
            ))),
        }
    }
}

pub trait Engine: Send {
    fn begin(&mut self, mode: TransactionMode) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;
    /// False once the engine itself has ended the transaction, even if
    /// `commit`/`rollback` has not been called yet.
    fn in_transaction(&self) -> bool;

    /// Run a statement and return the number of affected rows.
    fn execute_statement(&mut self, sql: &str, params: &[&Value]) -> Result<i64>;

    /// Run a query. `None` when the statement produces no result set.
    fn execute_query(&mut self, sql: &str, params: &[&Value]) -> Result<Option<Sequence>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_raw() {
        assert_eq!(TransactionMode::from_raw(0).unwrap(), TransactionMode::ReadOnly);
        assert_eq!(TransactionMode::from_raw(3).unwrap(), TransactionMode::Exclusive);
        assert!(TransactionMode::from_raw(4).is_err());
    }
}
