use cycletrack_core::store::migrations::latest_version;
use cycletrack_core::{KeyValueStore, SqliteKeyValueStore, StoreError};
use rusqlite::Connection;

#[test]
fn open_in_memory_applies_all_migrations() {
    let store = SqliteKeyValueStore::open_in_memory().unwrap();

    assert_eq!(schema_version(store.connection()), latest_version());
    assert_table_exists(store.connection(), "kv_entries");
}

#[test]
fn reopening_same_file_keeps_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cycletrack.db");

    let first = SqliteKeyValueStore::open(&path).unwrap();
    first.set("periodTracker", "[]").unwrap();
    drop(first);

    let second = SqliteKeyValueStore::open(&path).unwrap();
    assert_eq!(schema_version(second.connection()), latest_version());
    assert_eq!(second.get("periodTracker").unwrap().as_deref(), Some("[]"));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match SqliteKeyValueStore::open(&path) {
        Err(StoreError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        }) => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("newer schema must be rejected"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
