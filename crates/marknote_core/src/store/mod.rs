//! Key-addressed persistence of JSON documents with an in-memory cache.
//!
//! # Responsibility
//! - Abstract the durable key/value medium behind `KvBackend`.
//! - Keep one cached, typed copy of each document in sync with storage.
//!
//! # Invariants
//! - Every write is synchronous; there is no batching or coalescing.
//! - The cache only changes after the backend accepted the write.
//! - Documents newer than `DOCUMENT_VERSION` are never overwritten.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod backend;
pub mod persistent;

pub use backend::{KvBackend, MemoryKv, SqliteKv};
pub use persistent::{LoadWarning, PersistentStore, DOCUMENT_VERSION};

pub type StoreResult<T> = Result<T, StoreError>;

/// Default storage key for the raw note collection.
pub const NOTES_KEY: &str = "NOTES";
/// Default storage key for the tag collection.
pub const TAGS_KEY: &str = "TAGS";

/// Storage keys used by one notes session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    pub notes: String,
    pub tags: String,
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self {
            notes: NOTES_KEY.to_string(),
            tags: TAGS_KEY.to_string(),
        }
    }
}

/// Failure reading or writing a persisted document.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite failure.
    Db(DbError),
    /// Backend refused the write (read-only medium, quota exhausted).
    WriteRejected { key: String, reason: String },
    /// Value could not be encoded as JSON.
    Serialize(serde_json::Error),
    /// Stored document was written by a newer schema.
    UnsupportedVersion {
        key: String,
        found: u64,
        latest_supported: u32,
    },
    /// Connection is missing the key/value table.
    MissingRequiredTable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::WriteRejected { key, reason } => {
                write!(f, "write to `{key}` rejected: {reason}")
            }
            Self::Serialize(err) => write!(f, "failed to encode document: {err}"),
            Self::UnsupportedVersion {
                key,
                found,
                latest_supported,
            } => write!(
                f,
                "document `{key}` has version {found}, newer than supported {latest_supported}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection not migrated: missing table `{table}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::WriteRejected { .. }
            | Self::UnsupportedVersion { .. }
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}
