//! In-memory table backing every store.
//!
//! A [`Table`] is a key-ordered map behind a `RwLock`. Locks are held for a
//! single access only, never across calls, so a store can scan siblings and
//! cascade deletes without lock-ordering concerns.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::RwLock;

use crate::record::{Record, StoreKind};
use crate::storage::traits::StorageError;

fn lock_err(store: StoreKind, context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {store}.{context}"))
}

/// Thread-safe keyed table for one record type.
pub struct Table<T: Record> {
    rows: RwLock<BTreeMap<String, T>>,
}

impl<T: Record> Table<T> {
    /// Create a new empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    /// The store kind this table belongs to.
    #[must_use]
    pub const fn kind(&self) -> StoreKind {
        T::KIND
    }

    pub(crate) fn not_found(&self, key: &str) -> StorageError {
        StorageError::KeyNotFound {
            key: key.to_string(),
            store: T::KIND,
        }
    }

    /// Insert under `record.key()`, refusing occupied keys.
    pub(crate) fn insert_new(&self, record: T) -> Result<T, StorageError> {
        let mut rows = self.rows.write().map_err(|_| lock_err(T::KIND, "insert"))?;
        if rows.contains_key(record.key()) {
            return Err(StorageError::KeyAlreadyExists {
                key: record.key().to_string(),
                store: T::KIND,
            });
        }
        rows.insert(record.key().to_string(), record.clone());
        Ok(record)
    }

    pub(crate) fn get(&self, key: &str) -> Result<T, StorageError> {
        let rows = self.rows.read().map_err(|_| lock_err(T::KIND, "get"))?;
        rows.get(key).cloned().ok_or_else(|| self.not_found(key))
    }

    /// Replace the value under an existing `key`.
    pub(crate) fn replace(&self, key: &str, record: T) -> Result<T, StorageError> {
        let mut rows = self.rows.write().map_err(|_| lock_err(T::KIND, "replace"))?;
        let slot = rows.get_mut(key).ok_or_else(|| self.not_found(key))?;
        *slot = record.clone();
        Ok(record)
    }

    pub(crate) fn remove(&self, key: &str) -> Result<T, StorageError> {
        let mut rows = self.rows.write().map_err(|_| lock_err(T::KIND, "remove"))?;
        rows.remove(key).ok_or_else(|| self.not_found(key))
    }

    pub(crate) fn contains(&self, key: &str) -> Result<bool, StorageError> {
        let rows = self.rows.read().map_err(|_| lock_err(T::KIND, "contains"))?;
        Ok(rows.contains_key(key))
    }

    pub(crate) fn len(&self) -> Result<usize, StorageError> {
        let rows = self.rows.read().map_err(|_| lock_err(T::KIND, "len"))?;
        Ok(rows.len())
    }

    pub(crate) fn keys(&self) -> Result<Vec<String>, StorageError> {
        let rows = self.rows.read().map_err(|_| lock_err(T::KIND, "keys"))?;
        Ok(rows.keys().cloned().collect())
    }

    pub(crate) fn snapshot(&self) -> Result<Vec<(String, T)>, StorageError> {
        let rows = self.rows.read().map_err(|_| lock_err(T::KIND, "snapshot"))?;
        Ok(rows.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    pub(crate) fn select_keys<P>(&self, mut predicate: P) -> Result<Vec<String>, StorageError>
    where
        P: FnMut(&T) -> bool,
    {
        let rows = self.rows.read().map_err(|_| lock_err(T::KIND, "select_keys"))?;
        Ok(rows
            .iter()
            .filter(|(_, record)| predicate(record))
            .map(|(k, _)| k.clone())
            .collect())
    }
}

impl<T: Record> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.rows.read().map(|rows| rows.len()).ok();
        f.debug_struct("Table")
            .field("kind", &T::KIND)
            .field("len", &len)
            .finish()
    }
}
