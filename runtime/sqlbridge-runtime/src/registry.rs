///
/// Process-wide registry behind every C handle.
///
/// Holds the value store, open databases and active transactions. Handles
/// for databases and transactions share one counter and are never reused.
/// Each database owns a database allocator; each transaction owns a
/// transaction allocator that is retired when the transaction ends, which
/// invalidates every value it still held.
///

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

use sqlbridge_core::{
    AllocatorId, AllocatorKind, Config, Engine, Result, SqlError, Store, TransactionMode,
};
use sqlbridge_sqlite::SqliteEngine;
use tracing::debug;

pub(crate) struct DatabaseEntry {
    pub engine: SqliteEngine,
    pub allocator: AllocatorId,
    pub transaction: Option<u64>,
}

pub(crate) struct TransactionEntry {
    pub database: u64,
    pub allocator: AllocatorId,
    /// Scheduling hint given at begin. SQLite serializes writers itself, so
    /// the value is recorded and reported but does not reorder anything.
    pub priority: i32,
}

pub(crate) struct Runtime {
    pub store: Store,
    pub config: Config,
    databases: HashMap<u64, DatabaseEntry>,
    transactions: HashMap<u64, TransactionEntry>,
    next_id: u64,
}

static RUNTIME: LazyLock<Mutex<Runtime>> =
    LazyLock::new(|| Mutex::new(Runtime::new(Config::default())));

/// Run `f` with exclusive access to the registry. A panic in an earlier
/// call does not lock the registry out.
pub(crate) fn with_runtime<T>(f: impl FnOnce(&mut Runtime) -> Result<T>) -> Result<T> {
    let mut runtime = RUNTIME.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut runtime)
}

impl Runtime {
    fn new(config: Config) -> Self {
        Self {
            store: Store::new(&config),
            config,
            databases: HashMap::new(),
            transactions: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn apply_config(&mut self, config: Config) {
        self.store.apply_config(&config);
        self.config = config;
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn open_database(&mut self, engine: SqliteEngine) -> u64 {
        let id = self.next_id();
        let allocator = self.store.create_allocator(AllocatorKind::Database);
        self.databases.insert(
            id,
            DatabaseEntry {
                engine,
                allocator,
                transaction: None,
            },
        );
        debug!(database = id, "database registered");
        id
    }

    pub fn close_database(&mut self, id: u64) -> Result<()> {
        let mut entry = self.databases.remove(&id).ok_or_else(|| unknown("database", id))?;
        let mut rolled_back = Ok(());
        if let Some(txn) = entry.transaction.take() {
            rolled_back = entry.engine.rollback();
            if let Some(txn) = self.transactions.remove(&txn) {
                self.store.retire_allocator(txn.allocator)?;
            }
        }
        self.store.retire_allocator(entry.allocator)?;
        debug!(database = id, "database closed");
        rolled_back
    }

    pub fn database(&self, id: u64) -> Result<&DatabaseEntry> {
        self.databases.get(&id).ok_or_else(|| unknown("database", id))
    }

    pub fn transaction(&self, id: u64) -> Result<&TransactionEntry> {
        self.transactions.get(&id).ok_or_else(|| unknown("transaction", id))
    }

    pub fn begin(&mut self, database: u64, mode: TransactionMode, priority: i32) -> Result<u64> {
        let id = self.next_id;
        let entry = self
            .databases
            .get_mut(&database)
            .ok_or_else(|| unknown("database", database))?;
        if let Some(stale) = entry.transaction.filter(|_| !entry.engine.in_transaction()) {
            entry.transaction = None;
            if let Some(txn) = self.transactions.remove(&stale) {
                let freed = self.store.retire_allocator(txn.allocator)?;
                debug!(transaction = stale, freed, "retired transaction ended by the engine");
            }
        }
        entry.engine.begin(mode)?;
        entry.transaction = Some(id);
        self.next_id += 1;
        let allocator = self.store.create_allocator(AllocatorKind::Transaction);
        self.transactions.insert(
            id,
            TransactionEntry {
                database,
                allocator,
                priority,
            },
        );
        debug!(database, transaction = id, ?mode, priority, "transaction registered");
        Ok(id)
    }

    /// Commit or roll back. The transaction stays registered only while
    /// the engine still has it open after a refused commit or rollback.
    pub fn finish(&mut self, id: u64, commit: bool) -> Result<()> {
        let database = self.transaction(id)?.database;
        let entry = self
            .databases
            .get_mut(&database)
            .ok_or_else(|| unknown("database", database))?;
        let outcome = if commit {
            entry.engine.commit()
        } else {
            entry.engine.rollback()
        };
        if outcome.is_err() && entry.engine.in_transaction() {
            return outcome;
        }
        entry.transaction = None;
        if let Some(txn) = self.transactions.remove(&id) {
            let freed = self.store.retire_allocator(txn.allocator)?;
            debug!(transaction = id, commit, freed, "transaction finished");
        }
        outcome
    }

    /// Engine and result allocator for a call made against `database`,
    /// optionally inside `transaction` (0 for none).
    pub fn target(
        &mut self,
        database: u64,
        transaction: u64,
    ) -> Result<(&mut SqliteEngine, &mut Store, AllocatorId)> {
        let allocator = if transaction == 0 {
            None
        } else {
            let txn = self.transaction(transaction)?;
            if txn.database != database {
                return Err(SqlError::invalid_operation(format!(
                    "transaction {transaction} does not belong to database {database}"
                )));
            }
            Some(txn.allocator)
        };
        let entry = self
            .databases
            .get_mut(&database)
            .ok_or_else(|| unknown("database", database))?;
        let allocator = allocator.unwrap_or(entry.allocator);
        Ok((&mut entry.engine, &mut self.store, allocator))
    }
}

fn unknown(kind: &str, id: u64) -> SqlError {
    SqlError::StaleHandle(format!("{kind} handle {id} is not open"))
}
