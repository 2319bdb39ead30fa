//! Abstract storage traits.
//!
//! Every entity type gets one store implementing [`EntityStore`]. A store
//! supplies its table, its registry handle and its two dependency rules; the
//! trait supplies create/read/update/delete on top of those, so the cascade
//! traversal exists exactly once.

use std::fmt;

use thiserror::Error;
use tracing::{debug, trace};

use crate::error::ValidationError;
use crate::record::{Record, RecordRef, StoreKind};
use crate::storage::memory::Table;
use crate::storage::registry::RegistryHandle;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// `create` hit an occupied key.
    #[error("Key already exists in {store} store: {key}")]
    KeyAlreadyExists {
        /// The occupied key.
        key: String,
        /// Store that rejected the insert.
        store: StoreKind,
    },

    /// `read`, `update` or a top-level `delete` named an absent key.
    #[error("Key not found in {store} store: {key}")]
    KeyNotFound {
        /// The absent key.
        key: String,
        /// Store that was searched.
        store: StoreKind,
    },

    /// A back dependent of the record does not exist.
    #[error("{store} '{key}' depends on missing {dependency}")]
    MissingDependency {
        /// Key of the record being written.
        key: String,
        /// Store of the record being written.
        store: StoreKind,
        /// The absent record it refers to.
        dependency: RecordRef,
    },

    /// The store was used for a cross-store operation without a live registry.
    #[error("{store} store is not attached to a registry")]
    RegistryUnavailable {
        /// The detached store.
        store: StoreKind,
    },

    /// The record failed structural validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Seed data could not be parsed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

impl StorageError {
    /// Returns true if this is a `KeyNotFound` error.
    #[must_use]
    pub const fn is_key_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }

    /// Returns true if this is a `KeyAlreadyExists` error.
    #[must_use]
    pub const fn is_key_already_exists(&self) -> bool {
        matches!(self, Self::KeyAlreadyExists { .. })
    }
}

/// A per-type dependency descriptor.
///
/// Each entity type defines its own grouping (regions, commodities, ...);
/// the only shared behaviour is flattening the groups into record references.
pub trait Dependents: fmt::Debug + Clone + Default + PartialEq {
    /// All referenced records, group by group, in scan order.
    fn refs(&self) -> Vec<RecordRef>;

    /// True when no record is referenced.
    fn is_empty(&self) -> bool {
        self.refs().is_empty()
    }
}

/// Storage contract for one entity type.
///
/// Dependency resolution is computed on demand by scanning sibling stores
/// through the registry; there is no reverse index to keep in sync.
pub trait EntityStore: Send + Sync {
    /// The record type held.
    type Record: Record;
    /// Keys this record requires to exist.
    type BackDependents: Dependents;
    /// Keys of other records that require this one to exist.
    type ForwardDependents: Dependents;

    /// Backing table.
    fn table(&self) -> &Table<Self::Record>;

    /// Handle to the registry this store was attached to.
    fn registry(&self) -> &RegistryHandle;

    /// Records `record` depends on. Never mutates.
    ///
    /// # Errors
    /// Implementations that consult the registry fail when it is unavailable.
    fn back_dependents(&self, record: &Self::Record)
        -> Result<Self::BackDependents, StorageError>;

    /// Records in sibling stores that reference `key`. Never mutates.
    ///
    /// Siblings refer to a record by its table key, which `update` never
    /// changes, so the scan is driven by the key and not by record content.
    /// Each key appears at most once per group.
    ///
    /// # Errors
    /// `RegistryUnavailable` when the store is not attached to a live registry.
    fn forward_dependents_of(&self, key: &str) -> Result<Self::ForwardDependents, StorageError>;

    /// Records in sibling stores that reference `record`, looked up by
    /// `record.key()`. Never mutates.
    ///
    /// # Errors
    /// As for [`forward_dependents_of`](Self::forward_dependents_of).
    fn forward_dependents(
        &self,
        record: &Self::Record,
    ) -> Result<Self::ForwardDependents, StorageError> {
        self.forward_dependents_of(record.key())
    }

    /// Which store this is.
    fn kind(&self) -> StoreKind {
        <Self::Record as Record>::KIND
    }

    /// Insert a new record under its key.
    ///
    /// # Errors
    /// - `Validation` if the record is malformed
    /// - `MissingDependency` if back dependents are enforced and one is absent
    /// - `KeyAlreadyExists` if the key is occupied
    fn create(&self, record: Self::Record) -> Result<Self::Record, StorageError> {
        record.validate()?;
        self.ensure_back_dependents(&record)?;
        self.table().insert_new(record)
    }

    /// Fetch the record stored under `key`.
    ///
    /// # Errors
    /// `KeyNotFound` if absent.
    fn read(&self, key: &str) -> Result<Self::Record, StorageError> {
        self.table().get(key)
    }

    /// Replace the record stored under `key`.
    ///
    /// The key itself is immutable; whether `record.key()` matches `key` is
    /// the caller's business. Dependents are keyed by `key`, so nothing
    /// propagates.
    ///
    /// # Errors
    /// `KeyNotFound` if absent, otherwise as for [`create`](Self::create).
    fn update(&self, key: &str, record: Self::Record) -> Result<Self::Record, StorageError> {
        if !self.table().contains(key)? {
            return Err(self.table().not_found(key));
        }
        record.validate()?;
        self.ensure_back_dependents(&record)?;
        self.table().replace(key, record)
    }

    /// Delete `key`, first deleting every forward dependent.
    ///
    /// A nested delete that reports `KeyNotFound` means an earlier cascade
    /// step already removed that dependent; it is skipped. Any other nested
    /// failure is returned as-is and earlier sibling deletions stay done.
    ///
    /// # Errors
    /// `KeyNotFound` if `key` is absent on entry.
    fn delete(&self, key: &str) -> Result<(), StorageError> {
        if !self.contains(key)? {
            return Err(self.table().not_found(key));
        }
        let forward = self.forward_dependents_of(key)?.refs();

        if !forward.is_empty() {
            let registry = self.registry().get(self.kind())?;
            debug!(
                store = %self.kind(),
                key,
                dependents = forward.len(),
                "cascading delete"
            );
            for dependent in &forward {
                match registry.delete_record(dependent) {
                    Ok(()) => {}
                    Err(StorageError::KeyNotFound { .. }) => {
                        trace!(
                            store = %self.kind(),
                            dependent = %dependent,
                            "dependent already removed"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        self.table().remove(key)?;
        Ok(())
    }

    /// Reject `record` if back dependents are enforced and one is absent.
    ///
    /// A store not attached to a registry has nothing to check against.
    ///
    /// # Errors
    /// `MissingDependency` naming the first absent dependency.
    fn ensure_back_dependents(&self, record: &Self::Record) -> Result<(), StorageError> {
        let Some(registry) = self.registry().upgrade() else {
            return Ok(());
        };
        if !registry.config().enforce_back_dependents {
            return Ok(());
        }
        for dependency in self.back_dependents(record)?.refs() {
            if !registry.contains(&dependency)? {
                return Err(StorageError::MissingDependency {
                    key: record.key().to_string(),
                    store: self.kind(),
                    dependency,
                });
            }
        }
        Ok(())
    }

    /// Snapshot of every `(key, record)` pair, ordered by key.
    ///
    /// # Errors
    /// `BackendError` on a poisoned lock.
    fn records(&self) -> Result<Vec<(String, Self::Record)>, StorageError> {
        self.table().snapshot()
    }

    /// Keys of records matching `predicate`, ordered by key.
    ///
    /// # Errors
    /// `BackendError` on a poisoned lock.
    fn select_keys<P>(&self, predicate: P) -> Result<Vec<String>, StorageError>
    where
        P: FnMut(&Self::Record) -> bool,
        Self: Sized,
    {
        self.table().select_keys(predicate)
    }

    /// All keys, ordered.
    ///
    /// # Errors
    /// `BackendError` on a poisoned lock.
    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.table().keys()
    }

    /// # Errors
    /// `BackendError` on a poisoned lock.
    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        self.table().contains(key)
    }

    /// # Errors
    /// `BackendError` on a poisoned lock.
    fn len(&self) -> Result<usize, StorageError> {
        self.table().len()
    }

    /// # Errors
    /// `BackendError` on a poisoned lock.
    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    use crate::commodity::{Commodity, CommodityPrice, CommodityType};
    use crate::process::{Flow, Process};
    use crate::region::Region;
    use crate::storage::{Datastore, DatastoreConfig, DatastoreSeed};

    type Fields = Vec<(String, String)>;

    /// Records the fields of every event it sees.
    #[derive(Clone, Default)]
    struct CaptureLayer(Arc<Mutex<Vec<Fields>>>);

    struct FieldVisitor(Fields);

    impl Visit for FieldVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.push((field.name().to_string(), format!("{value:?}")));
        }
    }

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = FieldVisitor(Vec::new());
            event.record(&mut visitor);
            self.0.lock().unwrap().push(visitor.0);
        }
    }

    fn field(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::KeyNotFound {
            key: "R1".to_string(),
            store: StoreKind::Region,
        };
        assert_eq!(err.to_string(), "Key not found in region store: R1");
        assert!(err.is_key_not_found());
        assert!(!err.is_key_already_exists());

        let err = StorageError::MissingDependency {
            key: "P1".to_string(),
            store: StoreKind::Process,
            dependency: RecordRef::region("R9"),
        };
        assert!(err.to_string().contains("region:R9"));
    }

    #[test]
    fn suppressed_dependent_is_traced_with_its_store() {
        // Deleting C1 removes P1 first, so R1's own delete of P1 is suppressed.
        let seed = DatastoreSeed::default()
            .with_region(Region::new("R1"))
            .with_commodity(
                Commodity::new("C1", CommodityType::Energy)
                    .with_price(CommodityPrice::new("R1", 0, 1.0)),
            )
            .with_process(Process::new("P1", "R1").with_input(Flow::new("C1", 1.0)));
        let ds = Datastore::with_seed(seed, DatastoreConfig::default()).unwrap();

        let capture = CaptureLayer::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        tracing::subscriber::with_default(subscriber, || ds.regions().delete("R1")).unwrap();

        let events = capture.0.lock().unwrap();
        let suppressed = events
            .iter()
            .find(|fields| fields.contains(&field("message", "dependent already removed")))
            .expect("suppressed KeyNotFound should be traced");
        assert!(suppressed.contains(&field("store", "region")));
        assert!(suppressed.contains(&field("dependent", "process:P1")));
    }

    #[test]
    fn test_validation_error_converts() {
        let err: StorageError = ValidationError::EmptyKey {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(err, StorageError::Validation(_)));
    }
}
