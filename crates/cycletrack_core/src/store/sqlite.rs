//! SQLite-backed key-value store.
//!
//! # Responsibility
//! - Open file or in-memory connections and migrate them before use.
//! - Upsert and read single string entries in `kv_entries`.
//!
//! # Invariants
//! - A constructed store always has migrations fully applied.
//! - Logged events never include stored values.

use super::migrations::apply_migrations;
use super::{KeyValueStore, StoreResult};
use log::{debug, error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Key-value store persisted in a SQLite database.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Opens (or creates) a database file and applies pending migrations.
    ///
    /// # Side effects
    /// - Emits `store_open` events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::bootstrap("file", || Connection::open(path))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::bootstrap("memory", Connection::open_in_memory)
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn bootstrap(
        mode: &'static str,
        connect: impl FnOnce() -> rusqlite::Result<Connection>,
    ) -> StoreResult<Self> {
        let started_at = Instant::now();
        info!("event=store_open module=store status=start mode={mode}");

        match connect_and_migrate(connect) {
            Ok(conn) => {
                info!(
                    "event=store_open module=store status=ok mode={mode} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self { conn })
            }
            Err(err) => {
                error!(
                    "event=store_open module=store status=error mode={mode} duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn connect_and_migrate(
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> StoreResult<Connection> {
    let mut conn = connect()?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        debug!(
            "event=store_get module=store status=ok found={}",
            value.is_some()
        );
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        debug!(
            "event=store_set module=store status=ok bytes={}",
            value.len()
        );
        Ok(())
    }
}
