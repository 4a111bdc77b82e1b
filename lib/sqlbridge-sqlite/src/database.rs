///
/// SQLite engine.
///
/// One `SqliteEngine` wraps one rusqlite connection. Statements are
/// prepared per call; query results are materialized eagerly into a
/// reproducible sequence of records so they outlive the statement that
/// produced them.
///
/// Transactions are driven with explicit BEGIN/COMMIT/ROLLBACK on the
/// connection. Read-only transactions additionally switch the connection
/// to `query_only` until they end. SQLite may end a transaction on its own
/// (`INSERT OR ROLLBACK`, some I/O errors); the connection's autocommit flag
/// is the authority on whether one is still open.
///

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::Connection;
use sqlbridge_core::status::{SQL_INVALID_OPERAND, SQL_INVALID_STATE};
use sqlbridge_core::{
    Column, Config, Engine, Record, Result, Sequence, SqlError, TransactionMode, Type, Value,
};
use tracing::{debug, info, warn};

use crate::convert::{self, DeclaredType};
use crate::fault::{compile_fault, fault};

pub struct SqliteEngine {
    conn: Connection,
    mode: Option<TransactionMode>,
    segment_size: usize,
}

impl SqliteEngine {
    pub fn open(path: &Path, config: &Config) -> Result<Self> {
        let conn = Connection::open(path).map_err(fault)?;
        info!(path = %path.display(), "database opened");
        Self::with_connection(conn, config)
    }

    pub fn open_in_memory(config: &Config) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(fault)?;
        debug!("in-memory database opened");
        Self::with_connection(conn, config)
    }

    fn with_connection(conn: Connection, config: &Config) -> Result<Self> {
        conn.busy_timeout(Duration::from_millis(config.database.busy_timeout_ms))
            .map_err(fault)?;
        Ok(Self {
            conn,
            mode: None,
            segment_size: config.blob.segment_size,
        })
    }

    pub fn transaction_mode(&self) -> Option<TransactionMode> {
        self.mode
    }

    fn prepare(&self, sql: &str, params: &[&Value]) -> Result<rusqlite::Statement<'_>> {
        let mut stmt = self.conn.prepare(sql).map_err(compile_fault)?;
        let expected = stmt.parameter_count();
        if expected != params.len() {
            return Err(SqlError::fault(
                SQL_INVALID_OPERAND,
                format!("statement takes {expected} parameters, {} given", params.len()),
            ));
        }
        for (i, param) in params.iter().enumerate() {
            stmt.raw_bind_parameter(i + 1, convert::to_sqlite(param)?)
                .map_err(fault)?;
        }
        Ok(stmt)
    }

    fn finish(&mut self, sql: &str) -> Result<()> {
        let Some(mode) = self.mode else {
            return Err(SqlError::fault(SQL_INVALID_STATE, "no active transaction"));
        };
        if self.conn.is_autocommit() {
            // A statement such as INSERT OR ROLLBACK already ended it.
            self.forget_transaction(mode)?;
            warn!(?mode, sql, "transaction was already ended by the engine");
            return Ok(());
        }
        self.conn.execute_batch(sql).map_err(fault)?;
        self.forget_transaction(mode)?;
        debug!(?mode, sql, "transaction finished");
        Ok(())
    }

    fn forget_transaction(&mut self, mode: TransactionMode) -> Result<()> {
        self.mode = None;
        if mode == TransactionMode::ReadOnly {
            self.conn
                .execute_batch("PRAGMA query_only = OFF")
                .map_err(fault)?;
        }
        Ok(())
    }
}

impl Engine for SqliteEngine {
    fn begin(&mut self, mode: TransactionMode) -> Result<()> {
        if let Some(stale) = self.mode.filter(|_| self.conn.is_autocommit()) {
            warn!(mode = ?stale, "discarding transaction already ended by the engine");
            self.forget_transaction(stale)?;
        }
        if self.mode.is_some() {
            return Err(SqlError::fault(
                SQL_INVALID_STATE,
                "a transaction is already active",
            ));
        }
        let sql = match mode {
            TransactionMode::ReadOnly => {
                self.conn
                    .execute_batch("PRAGMA query_only = ON")
                    .map_err(fault)?;
                "BEGIN DEFERRED"
            }
            TransactionMode::Update | TransactionMode::ReadWrite => "BEGIN IMMEDIATE",
            TransactionMode::Exclusive => "BEGIN EXCLUSIVE",
        };
        if let Err(e) = self.conn.execute_batch(sql) {
            if mode == TransactionMode::ReadOnly {
                let _ = self.conn.execute_batch("PRAGMA query_only = OFF");
            }
            return Err(fault(e));
        }
        self.mode = Some(mode);
        debug!(?mode, "transaction started");
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.finish("COMMIT")
    }

    fn rollback(&mut self) -> Result<()> {
        self.finish("ROLLBACK")
    }

    fn in_transaction(&self) -> bool {
        self.mode.is_some() && !self.conn.is_autocommit()
    }

    fn execute_statement(&mut self, sql: &str, params: &[&Value]) -> Result<i64> {
        let mut stmt = self.prepare(sql, params)?;
        if stmt.column_count() > 0 {
            let mut rows = stmt.raw_query();
            let mut count = 0i64;
            while rows.next().map_err(fault)?.is_some() {
                count += 1;
            }
            return Ok(count);
        }
        let changed = stmt.raw_execute().map_err(fault)?;
        Ok(changed as i64)
    }

    fn execute_query(&mut self, sql: &str, params: &[&Value]) -> Result<Option<Sequence>> {
        let segment_size = self.segment_size;
        let mut stmt = self.prepare(sql, params)?;
        if stmt.column_count() == 0 {
            stmt.raw_execute().map_err(fault)?;
            return Ok(None);
        }

        let declared: Vec<(String, Option<DeclaredType>)> = stmt
            .columns()
            .iter()
            .map(|c| {
                (
                    c.name().to_string(),
                    c.decl_type().and_then(convert::parse_decl_type),
                )
            })
            .collect();
        // Declared type until a cell fails to convert to it; undeclared
        // columns take the type of their first non-null cell.
        let mut types: Vec<Type> = declared
            .iter()
            .map(|(_, decl)| decl.map_or(Type::Null, |d| d.ty))
            .collect();
        let mut rows_out: Vec<Vec<Value>> = Vec::new();

        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next().map_err(fault)? {
            let mut values = Vec::with_capacity(declared.len());
            for (i, (name, decl)) in declared.iter().enumerate() {
                let raw = row.get_ref(i).map_err(fault)?;
                let value = convert::from_sqlite(raw, *decl, segment_size);
                let found = value.value_type();
                let settled = decl.map_or(Type::Null, |d| d.ty);
                if found != Type::Null && found != types[i] && types[i] == settled {
                    if settled != Type::Null {
                        debug!(
                            column = %name,
                            declared = %settled,
                            %found,
                            "cell kept its storage class"
                        );
                    }
                    types[i] = found;
                }
                values.push(value);
            }
            rows_out.push(values);
        }

        let columns: Arc<[Column]> = declared
            .into_iter()
            .zip(types)
            .map(|((name, _), ty)| Column::new(name, ty))
            .collect();
        let records = rows_out
            .into_iter()
            .map(|values| -> Result<Value> {
                Ok(Value::Struct(Record::new(columns.clone(), values)?))
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(rows = records.len(), columns = columns.len(), "query materialized");
        Ok(Some(Sequence::materialized(Type::Struct, records)))
    }
}

impl Drop for SqliteEngine {
    fn drop(&mut self) {
        if self.in_transaction() {
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}
