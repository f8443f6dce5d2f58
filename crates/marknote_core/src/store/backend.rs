//! Durable key/value media for persisted documents.

use crate::store::{StoreError, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Minimal string key/value contract behind `PersistentStore`.
pub trait KvBackend {
    /// Returns the raw document stored under `key`, if any.
    fn read(&self, key: &str) -> StoreResult<Option<String>>;
    /// Replaces the raw document stored under `key`.
    fn write(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// SQLite-backed key/value medium over the `kv_entries` table.
pub struct SqliteKv<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKv<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when `kv_entries` is absent.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = 'kv_entries'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(StoreError::MissingRequiredTable("kv_entries"));
        }
        Ok(Self { conn })
    }
}

impl KvBackend for SqliteKv<'_> {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Process-local medium for tests and throwaway sessions.
///
/// Writes can be switched off to exercise storage-failure paths.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RefCell<HashMap<String, String>>,
    reject_writes: Cell<bool>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `true`, every subsequent write fails with `WriteRejected`.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    /// Stores a raw document directly, bypassing any encoding.
    pub fn put_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.borrow_mut().insert(key.into(), value.into());
    }

    /// Returns the raw document under `key`.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KvBackend for MemoryKv {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.get_raw(key))
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.reject_writes.get() {
            return Err(StoreError::WriteRejected {
                key: key.to_string(),
                reason: "storage is read-only".to_string(),
            });
        }
        self.put_raw(key, value);
        Ok(())
    }
}
