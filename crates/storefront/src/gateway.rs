//! Persistence gateway: the durable key/value storage boundary.
//!
//! The favorites and orders stores survive page reloads by round-tripping
//! JSON arrays through origin-scoped key/value storage. This module owns
//! that boundary: the [`PersistenceGateway`] trait a host implements over
//! its storage, the fixed keys, and a single schema-validating
//! decode/encode pair. Malformed or missing values normalize to the empty
//! collection here, centrally, so no store ever has to shape-guess
//! persisted data.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Keys used in the shared key/value space.
///
/// Each store owns exactly one key; no two logical callers write the same
/// key.
pub mod keys {
    /// JSON array of favorited product ids.
    pub const FAVORITES: &str = "favorites";
    /// JSON array of locally recorded orders.
    pub const ORDERS: &str = "orders";
    /// JSON array of cancellation-request records.
    pub const CANCELLATION_REQUESTS: &str = "cancellationRequests";
}

/// A local storage read or write failed.
///
/// These are logged and swallowed at the gateway boundary: the operation
/// simply had no durable effect this time, and in-memory state still
/// advances so the current session behaves correctly.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading a key failed.
    #[error("storage read failed: {0}")]
    Read(String),

    /// Writing a key failed (e.g., quota exceeded).
    #[error("storage write failed: {0}")]
    Write(String),
}

/// Synchronous, origin-scoped key/value durable storage.
///
/// Values are JSON-encoded strings. Implementations must not panic on
/// failure; they report it and the gateway layer decides what to do.
pub trait PersistenceGateway {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Read`] if the underlying storage cannot
    /// be read.
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Write`] if the underlying storage cannot
    /// be written.
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for &G {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (*self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (*self).set(key, value)
    }
}

/// Load a persisted JSON array, normalizing every failure to empty.
///
/// A missing key, a read error, or a malformed value all yield the empty
/// collection; the latter two are logged at `warn`. This is the single
/// place persisted data is schema-checked.
pub fn load_collection<T: DeserializeOwned>(
    gateway: &impl PersistenceGateway,
    key: &str,
) -> Vec<T> {
    match gateway.get(key) {
        Ok(Some(raw)) => match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding malformed persisted collection");
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!(key, error = %e, "storage read failed, starting empty");
            Vec::new()
        }
    }
}

/// Write a collection as a JSON array, logging and swallowing failures.
///
/// In-memory state is the caller's source of truth either way; a failed
/// write only means the change does not survive a reload.
pub fn store_collection<T: Serialize>(gateway: &impl PersistenceGateway, key: &str, items: &[T]) {
    let raw = match serde_json::to_string(items) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(key, error = %e, "failed to encode collection for storage");
            return;
        }
    };

    if let Err(e) = gateway.set(key, &raw) {
        tracing::warn!(key, error = %e, "storage write failed, keeping in-memory state only");
    }
}

/// In-process gateway over a hash map.
///
/// Used by tests and by non-browser embeddings that have no origin-scoped
/// storage. Reads and writes can be made to fail on demand to exercise the
/// swallow paths.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    inner: std::sync::Mutex<MemoryGatewayInner>,
}

#[derive(Debug, Default)]
struct MemoryGatewayInner {
    values: std::collections::HashMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryGateway {
    /// Create an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing JSON encoding.
    ///
    /// Lets tests plant corrupt data under a store's key.
    pub fn insert_raw(&self, key: &str, value: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.values.insert(key.to_owned(), value.to_owned());
        }
    }

    /// Read the raw stored value, bypassing the gateway contract.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.values.get(key).cloned())
    }

    /// Make subsequent reads fail.
    pub fn set_fail_reads(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_reads = fail;
        }
    }

    /// Make subsequent writes fail.
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_writes = fail;
        }
    }
}

impl PersistenceGateway for MemoryGateway {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| PersistenceError::Read("storage lock poisoned".to_owned()))?;
        if inner.fail_reads {
            return Err(PersistenceError::Read("simulated read failure".to_owned()));
        }
        Ok(inner.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| PersistenceError::Write("storage lock poisoned".to_owned()))?;
        if inner.fail_writes {
            return Err(PersistenceError::Write(
                "simulated write failure".to_owned(),
            ));
        }
        inner.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
