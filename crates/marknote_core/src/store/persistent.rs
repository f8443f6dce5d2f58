//! Typed, cached document store over a `KvBackend`.
//!
//! # Responsibility
//! - Load one JSON document per key, seeding a default on first use.
//! - Persist every change synchronously before updating the cache.
//! - Wrap documents in a versioned envelope for future migrations.
//!
//! # Invariants
//! - Malformed documents fall back to the default and record a warning; the
//!   stored bytes are left untouched until the next successful write.
//! - Unversioned legacy documents (bare JSON values) are accepted on read.

use crate::store::{KvBackend, StoreError, StoreResult};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Envelope version written by this binary.
pub const DOCUMENT_VERSION: u32 = 1;

/// Recovery notice recorded when a stored document could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub key: String,
    pub reason: String,
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    version: u32,
    data: &'a T,
}

enum DecodeError {
    Malformed(String),
    UnsupportedVersion(u64),
}

/// Cached persistent value bound to a single storage key.
pub struct PersistentStore<'b, T, B: KvBackend + ?Sized> {
    backend: &'b B,
    key: String,
    value: T,
    load_warning: Option<LoadWarning>,
}

impl<'b, T, B> PersistentStore<'b, T, B>
where
    T: Serialize + DeserializeOwned,
    B: KvBackend + ?Sized,
{
    /// Loads the document under `key`, or stores and returns `default`.
    ///
    /// # Errors
    /// - Backend read failure, or write failure while seeding `default`.
    /// - `UnsupportedVersion` when the document comes from a newer schema.
    pub fn initialize(backend: &'b B, key: impl Into<String>, default: T) -> StoreResult<Self> {
        let key = key.into();
        let Some(raw) = backend.read(&key)? else {
            backend.write(&key, &encode(&default)?)?;
            info!("event=store_init module=store status=ok key={key} source=default");
            return Ok(Self {
                backend,
                key,
                value: default,
                load_warning: None,
            });
        };

        match decode::<T>(&raw) {
            Ok(value) => {
                info!("event=store_init module=store status=ok key={key} source=stored");
                Ok(Self {
                    backend,
                    key,
                    value,
                    load_warning: None,
                })
            }
            Err(DecodeError::UnsupportedVersion(found)) => {
                Err(StoreError::UnsupportedVersion {
                    key,
                    found,
                    latest_supported: DOCUMENT_VERSION,
                })
            }
            Err(DecodeError::Malformed(reason)) => {
                warn!(
                    "event=store_recovered module=store status=warn key={key} error_code=malformed_document bytes={}",
                    raw.len()
                );
                Ok(Self {
                    backend,
                    key: key.clone(),
                    value: default,
                    load_warning: Some(LoadWarning { key, reason }),
                })
            }
        }
    }

    /// Storage key this store is bound to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current cached value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Warning recorded when the stored document had to be discarded.
    pub fn load_warning(&self) -> Option<&LoadWarning> {
        self.load_warning.as_ref()
    }

    /// Replaces the value, persisting it before the cache changes.
    pub fn set(&mut self, value: T) -> StoreResult<()> {
        let encoded = encode(&value)?;
        self.backend.write(&self.key, &encoded)?;
        debug!(
            "event=store_write module=store status=ok key={} bytes={}",
            self.key,
            encoded.len()
        );
        self.value = value;
        Ok(())
    }

    /// Replaces the cached value and tries to persist it.
    ///
    /// Used for load-time cleanup: the cleaned value is served even when the
    /// medium refuses the write. Returns whether the write went through.
    pub fn repair(&mut self, value: T) -> bool {
        let persisted =
            encode(&value).and_then(|encoded| self.backend.write(&self.key, &encoded));
        if let Err(err) = &persisted {
            warn!(
                "event=store_repair module=store status=warn key={} error_code=repair_write_failed error={}",
                self.key, err
            );
        }
        self.value = value;
        persisted.is_ok()
    }

    /// Derives the next value from the cached one and persists it.
    pub fn update(&mut self, next: impl FnOnce(&T) -> T) -> StoreResult<()> {
        let value = next(&self.value);
        self.set(value)
    }
}

fn encode<T: Serialize>(value: &T) -> StoreResult<String> {
    let envelope = Envelope {
        version: DOCUMENT_VERSION,
        data: value,
    };
    Ok(serde_json::to_string(&envelope)?)
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, DecodeError> {
    let parsed: Value =
        serde_json::from_str(raw).map_err(|err| DecodeError::Malformed(err.to_string()))?;

    let payload = match parsed {
        Value::Object(mut fields) if fields.contains_key("version") => {
            let version = fields
                .get("version")
                .and_then(Value::as_u64)
                .ok_or_else(|| DecodeError::Malformed("`version` is not an integer".into()))?;
            if version > u64::from(DOCUMENT_VERSION) {
                return Err(DecodeError::UnsupportedVersion(version));
            }
            fields
                .remove("data")
                .ok_or_else(|| DecodeError::Malformed("missing `data` field".into()))?
        }
        legacy => legacy,
    };

    serde_json::from_value(payload).map_err(|err| DecodeError::Malformed(err.to_string()))
}
