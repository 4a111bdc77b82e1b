///
/// # Integration Tests for sqlbridge-sqlite
///
/// Drive the SQLite engine through the core store and execution bridge the
/// same way the C runtime does: parameters are store handles, result sets
/// land in an allocator as sequences of records.
///

use sqlbridge_core::bridge::{execute_query, execute_statement};
use sqlbridge_core::status::*;
use sqlbridge_core::{
    AllocatorId, AllocatorKind, Config, Engine, Store, TransactionMode, Type, Value, ValueHandle,
};
use sqlbridge_sqlite::SqliteEngine;
use tempfile::TempDir;

fn setup() -> (SqliteEngine, Store, AllocatorId) {
    let config = Config::default();
    let engine = SqliteEngine::open_in_memory(&config).expect("open in-memory database");
    let mut store = Store::new(&config);
    let allocator = store.create_allocator(AllocatorKind::Standalone);
    (engine, store, allocator)
}

fn exec(engine: &mut SqliteEngine, store: &Store, sql: &str) -> i64 {
    execute_statement(engine, store, sql, &[]).expect(sql)
}

fn collect_rows(store: &mut Store, seq: ValueHandle) -> Vec<Vec<Value>> {
    let mut out = Vec::new();
    store.seq_get_iterator(seq).unwrap();
    loop {
        let record = store.seq_next(seq).unwrap();
        if record.is_none() {
            break;
        }
        let values = store
            .get(record)
            .unwrap()
            .as_record()
            .unwrap()
            .values()
            .iter()
            .map(|v| v.try_clone().unwrap())
            .collect();
        out.push(values);
        let owner = store.owner(record).unwrap().unwrap();
        store.release(owner, record).unwrap();
    }
    out
}

#[test]
fn test_insert_three_rows_and_query_them_back() {
    let (mut engine, mut store, a) = setup();
    exec(&mut engine, &store, "CREATE TABLE t (id INTEGER, name VARCHAR(20))");

    for (id, name) in [(1i64, "one"), (2, "two"), (3, "three")] {
        let id = store.alloc(a, Value::Int(id)).unwrap();
        let name = store.alloc(a, Value::from(name)).unwrap();
        let n = execute_statement(&mut engine, &store, "INSERT INTO t VALUES (?, ?)", &[id, name])
            .unwrap();
        assert_eq!(n, 1);
        store.release(a, id).unwrap();
        store.release(a, name).unwrap();
    }

    let min = store.alloc(a, Value::Int(0)).unwrap();
    let seq = execute_query(
        &mut engine,
        &mut store,
        a,
        "SELECT id, name FROM t WHERE id > ? ORDER BY id",
        &[min],
    )
    .unwrap()
    .expect("result set");
    assert_eq!(store.seq_count(seq).unwrap(), 3);
    assert_eq!(store.seq_elem_type(seq).unwrap(), Type::Struct);

    store.seq_get_iterator(seq).unwrap();
    let mut ids = Vec::new();
    loop {
        let record = store.seq_next(seq).unwrap();
        if record.is_none() {
            break;
        }
        let column = store.record_column(record, 0).unwrap();
        let value = store.get(column.value()).unwrap();
        assert_eq!(value.value_type(), Type::Int);
        ids.push(value.int_value().unwrap());
        column.release(&mut store).unwrap();
        store.release(a, record).unwrap();
    }
    assert_eq!(ids, vec![1, 2, 3]);

    store.release(a, seq).unwrap();
    store.release(a, min).unwrap();
    assert_eq!(store.live_values(a).unwrap(), 0);
}

#[test]
fn test_result_set_is_reproducible() {
    let (mut engine, mut store, a) = setup();
    exec(&mut engine, &store, "CREATE TABLE t (n INTEGER)");
    exec(&mut engine, &store, "INSERT INTO t VALUES (1), (2), (3)");
    let seq = execute_query(&mut engine, &mut store, a, "SELECT n FROM t ORDER BY n", &[])
        .unwrap()
        .unwrap();
    let first = collect_rows(&mut store, seq);
    store.seq_reset(seq).unwrap();
    let second = collect_rows(&mut store, seq);
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_column_metadata() {
    let (mut engine, mut store, a) = setup();
    exec(
        &mut engine,
        &store,
        "CREATE TABLE t (id INTEGER, price NUMERIC(8,2), flag BOOLEAN, ts TIMESTAMP)",
    );
    exec(&mut engine, &store, "INSERT INTO t VALUES (1, 123.45, 1, 1700000000)");
    let seq = execute_query(
        &mut engine,
        &mut store,
        a,
        "SELECT id, price, flag, ts, count(*) AS c FROM t",
        &[],
    )
    .unwrap()
    .unwrap();
    store.seq_get_iterator(seq).unwrap();
    let record = store.seq_next(seq).unwrap();
    let columns = store.get(record).unwrap().as_record().unwrap().columns().to_vec();
    let types: Vec<Type> = columns.iter().map(|c| c.ty).collect();
    assert_eq!(
        types,
        vec![Type::Int, Type::Numeric, Type::Bool, Type::DateTime, Type::Int]
    );
    assert_eq!(columns[4].name, "c");

    let price = store.record_column(record, 1).unwrap();
    let n = store.get(price.value()).unwrap().numeric_value().unwrap();
    assert_eq!((n.scaled(), n.precision()), (12345, 2));
    price.release(&mut store).unwrap();

    let flag = store.record_column(record, 2).unwrap();
    assert_eq!(flag.value(), ValueHandle::TRUE);
    flag.release(&mut store).unwrap();
}

fn column_types(store: &mut Store, seq: ValueHandle) -> Vec<Type> {
    store.seq_get_iterator(seq).unwrap();
    let record = store.seq_next(seq).unwrap();
    let types = store
        .get(record)
        .unwrap()
        .as_record()
        .unwrap()
        .columns()
        .iter()
        .map(|c| c.ty)
        .collect();
    let owner = store.owner(record).unwrap().unwrap();
    store.release(owner, record).unwrap();
    types
}

#[test]
fn test_text_cells_convert_to_declared_type() {
    let (mut engine, mut store, a) = setup();
    exec(
        &mut engine,
        &store,
        "CREATE TABLE t (id INTEGER, created DATETIME DEFAULT CURRENT_TIMESTAMP, active BOOLEAN)",
    );
    exec(&mut engine, &store, "INSERT INTO t (id, active) VALUES (1, 'yes'), (2, 'no')");
    let seq = execute_query(&mut engine, &mut store, a, "SELECT created, active FROM t", &[])
        .unwrap()
        .unwrap();

    assert_eq!(column_types(&mut store, seq), vec![Type::DateTime, Type::Bool]);
    let rows = collect_rows(&mut store, seq);
    assert_eq!(rows[0][0].value_type(), Type::DateTime);
    assert!(rows[0][0].datetime_value().unwrap() > 1_600_000_000);
    assert_eq!(rows[0][1], Value::Bool(true));
    assert_eq!(rows[1][1], Value::Bool(false));
}

#[test]
fn test_unconvertible_cells_keep_storage_class() {
    let (mut engine, mut store, a) = setup();
    exec(&mut engine, &store, "CREATE TABLE t (id INTEGER, amount NUMERIC(10,2), day DATE)");
    exec(&mut engine, &store, "INSERT INTO t VALUES (1, 1.5, -1), (2, 'n/a', 0)");
    let seq = execute_query(
        &mut engine,
        &mut store,
        a,
        "SELECT amount, day FROM t ORDER BY id",
        &[],
    )
    .unwrap()
    .expect("a malformed cell does not fail the query");

    assert_eq!(column_types(&mut store, seq), vec![Type::String, Type::Int]);
    let rows = collect_rows(&mut store, seq);
    assert_eq!(rows[0][0].numeric_value().unwrap().scaled(), 150);
    assert_eq!(rows[1][0], Value::from("n/a"));
    assert_eq!(rows[0][1], Value::Int(-1));
    assert_eq!(rows[1][1], Value::DateTime(0));
}

#[test]
fn test_numeric_parameter_round_trip() {
    let (mut engine, mut store, a) = setup();
    exec(&mut engine, &store, "CREATE TABLE t (amount DECIMAL(10,2))");
    let amount = store.alloc(a, Value::numeric(-5, 2).unwrap()).unwrap();
    execute_statement(&mut engine, &store, "INSERT INTO t VALUES (?)", &[amount]).unwrap();
    let seq = execute_query(&mut engine, &mut store, a, "SELECT amount FROM t", &[])
        .unwrap()
        .unwrap();
    let rows = collect_rows(&mut store, seq);
    assert_eq!(rows[0][0].numeric_value().unwrap().to_string(), "-0.05");
}

#[test]
fn test_blob_column_streams_in_segments() {
    let mut config = Config::default();
    config.blob.segment_size = 1024;
    let mut engine = SqliteEngine::open_in_memory(&config).unwrap();
    let mut store = Store::new(&config);
    let a = store.create_allocator(AllocatorKind::Standalone);

    exec(&mut engine, &store, "CREATE TABLE files (data BLOB)");
    let payload: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
    let data = store.alloc(a, Value::binary(payload.clone())).unwrap();
    execute_statement(&mut engine, &store, "INSERT INTO files VALUES (?)", &[data]).unwrap();

    let seq = execute_query(&mut engine, &mut store, a, "SELECT data FROM files", &[])
        .unwrap()
        .unwrap();
    store.seq_get_iterator(seq).unwrap();
    let record = store.seq_next(seq).unwrap();
    let blob = store.record_column(record, 0).unwrap();
    let h = blob.value();
    assert_eq!(store.get(h).unwrap().value_type(), Type::Blob);
    assert_eq!(store.blob_available(h).unwrap(), 1024);

    let mut buf = [0u8; 700];
    let mut read = Vec::new();
    while store.blob_available(h).unwrap() > 0 {
        let n = store.blob_get(h, &mut buf).unwrap();
        read.extend_from_slice(&buf[..n]);
    }
    assert_eq!(read, payload);

    store.blob_reset(h, 0).unwrap();
    let n = store.blob_get(h, &mut buf).unwrap();
    assert_eq!(&buf[..n], &payload[..700]);
    blob.release(&mut store).unwrap();
}

#[test]
fn test_statement_without_result_set() {
    let (mut engine, mut store, a) = setup();
    let none =
        execute_query(&mut engine, &mut store, a, "CREATE TABLE t (x INTEGER)", &[]).unwrap();
    assert!(none.is_none());
    assert_eq!(store.live_values(a).unwrap(), 0);
}

#[test]
fn test_engine_faults() {
    let (mut engine, mut store, a) = setup();
    exec(&mut engine, &store, "CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT NOT NULL)");

    let err = execute_statement(&mut engine, &store, "SELEC oops", &[]).unwrap_err();
    assert_eq!(err.status(), COMPILE_ERROR);

    exec(&mut engine, &store, "INSERT INTO t VALUES (1, 'a')");
    let err = execute_statement(&mut engine, &store, "INSERT INTO t VALUES (1, 'b')", &[])
        .unwrap_err();
    assert_eq!(err.status(), NOT_UNIQUE);

    let err = execute_statement(&mut engine, &store, "INSERT INTO t VALUES (2, NULL)", &[])
        .unwrap_err();
    assert_eq!(err.status(), SQL_CONFLICT);

    let err =
        execute_statement(&mut engine, &store, "INSERT INTO t VALUES (?, ?)", &[]).unwrap_err();
    assert_eq!(err.status(), SQL_INVALID_OPERAND);

    let arr = store
        .alloc(a, Value::Array(sqlbridge_core::Array::new(Type::Int, 1).unwrap()))
        .unwrap();
    let err = execute_statement(&mut engine, &store, "SELECT ?", &[arr]).unwrap_err();
    assert_eq!(err.status(), INVALID_TYPE_CAST);
}

#[test]
fn test_select_through_execute_statement_counts_rows() {
    let (mut engine, store, _) = setup();
    exec(&mut engine, &store, "CREATE TABLE t (x INTEGER)");
    exec(&mut engine, &store, "INSERT INTO t VALUES (1), (2)");
    assert_eq!(exec(&mut engine, &store, "SELECT x FROM t"), 2);
}

#[test]
fn test_transaction_commit_and_rollback() {
    let (mut engine, store, _) = setup();
    exec(&mut engine, &store, "CREATE TABLE t (x INTEGER)");

    engine.begin(TransactionMode::ReadWrite).unwrap();
    assert!(engine.in_transaction());
    exec(&mut engine, &store, "INSERT INTO t VALUES (1)");
    engine.rollback().unwrap();
    assert_eq!(exec(&mut engine, &store, "SELECT x FROM t"), 0);

    engine.begin(TransactionMode::Exclusive).unwrap();
    exec(&mut engine, &store, "INSERT INTO t VALUES (1)");
    engine.commit().unwrap();
    assert!(!engine.in_transaction());
    assert_eq!(exec(&mut engine, &store, "SELECT x FROM t"), 1);

    assert_eq!(engine.commit().unwrap_err().status(), SQL_INVALID_STATE);
    engine.begin(TransactionMode::Update).unwrap();
    assert_eq!(
        engine.begin(TransactionMode::ReadWrite).unwrap_err().status(),
        SQL_INVALID_STATE
    );
    engine.rollback().unwrap();
}

#[test]
fn test_transaction_ended_by_engine_can_be_closed() {
    let (mut engine, store, _) = setup();
    exec(&mut engine, &store, "CREATE TABLE t (id INTEGER PRIMARY KEY)");

    engine.begin(TransactionMode::ReadWrite).unwrap();
    exec(&mut engine, &store, "INSERT INTO t VALUES (1)");
    let err = execute_statement(&mut engine, &store, "INSERT OR ROLLBACK INTO t VALUES (1)", &[])
        .unwrap_err();
    assert_eq!(err.status(), NOT_UNIQUE);
    assert!(!engine.in_transaction());

    engine.commit().unwrap();
    assert_eq!(engine.transaction_mode(), None);
    assert_eq!(exec(&mut engine, &store, "SELECT id FROM t"), 0);

    // Starting over without closing the dead transaction also works.
    engine.begin(TransactionMode::ReadWrite).unwrap();
    exec(&mut engine, &store, "INSERT INTO t VALUES (1)");
    execute_statement(&mut engine, &store, "INSERT OR ROLLBACK INTO t VALUES (1)", &[])
        .unwrap_err();
    engine.begin(TransactionMode::ReadWrite).unwrap();
    assert!(engine.in_transaction());
    engine.rollback().unwrap();
}

#[test]
fn test_failed_read_only_begin_leaves_connection_writable() {
    let (mut engine, store, _) = setup();
    exec(&mut engine, &store, "CREATE TABLE t (x INTEGER)");
    exec(&mut engine, &store, "BEGIN");

    assert!(engine.begin(TransactionMode::ReadOnly).is_err());
    assert_eq!(engine.transaction_mode(), None);
    exec(&mut engine, &store, "INSERT INTO t VALUES (1)");
    exec(&mut engine, &store, "COMMIT");
    assert_eq!(exec(&mut engine, &store, "SELECT x FROM t"), 1);
}

#[test]
fn test_read_only_transaction_rejects_writes() {
    let (mut engine, store, _) = setup();
    exec(&mut engine, &store, "CREATE TABLE t (x INTEGER)");

    engine.begin(TransactionMode::ReadOnly).unwrap();
    assert_eq!(engine.transaction_mode(), Some(TransactionMode::ReadOnly));
    let err = execute_statement(&mut engine, &store, "INSERT INTO t VALUES (1)", &[]).unwrap_err();
    assert_eq!(err.status(), SQL_INVALID_STATE);
    engine.rollback().unwrap();

    exec(&mut engine, &store, "INSERT INTO t VALUES (1)");
}

#[test]
fn test_file_database_persists() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("bridge.db");
    let config = Config::default();
    let store = Store::new(&config);

    {
        let mut engine = SqliteEngine::open(&path, &config).unwrap();
        exec(&mut engine, &store, "CREATE TABLE t (x INTEGER)");
        exec(&mut engine, &store, "INSERT INTO t VALUES (42)");
    }

    let mut engine = SqliteEngine::open(&path, &config).unwrap();
    assert_eq!(exec(&mut engine, &store, "SELECT x FROM t WHERE x = 42"), 1);
}
