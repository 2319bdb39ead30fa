//! Region store.
//!
//! Regions are the root of the model: nothing upstream, and every
//! commodity price, process and agent tagged with a region name depends on it.

use crate::record::RecordRef;
use crate::region::Region;
use crate::storage::memory::Table;
use crate::storage::registry::RegistryHandle;
use crate::storage::traits::{Dependents, EntityStore, StorageError};

/// Regions have no upstream dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionBackDependents {}

impl Dependents for RegionBackDependents {
    fn refs(&self) -> Vec<RecordRef> {
        Vec::new()
    }
}

/// Records tagged with a region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionForwardDependents {
    /// Commodities with at least one price observation in the region.
    pub commodities: Vec<String>,
    /// Processes installed in the region.
    pub processes: Vec<String>,
    /// Agents operating in the region.
    pub agents: Vec<String>,
}

impl Dependents for RegionForwardDependents {
    fn refs(&self) -> Vec<RecordRef> {
        self.commodities
            .iter()
            .map(RecordRef::commodity)
            .chain(self.processes.iter().map(RecordRef::process))
            .chain(self.agents.iter().map(RecordRef::agent))
            .collect()
    }
}

/// Keyed store of [`Region`]s.
#[derive(Debug, Default)]
pub struct RegionStore {
    table: Table<Region>,
    registry: RegistryHandle,
}

impl RegionStore {
    /// Build a store holding `regions`, inserted in order through `create`.
    ///
    /// # Errors
    /// Fails on the first invalid or duplicate region; later entries are not
    /// inserted.
    pub fn new(regions: Vec<Region>) -> Result<Self, StorageError> {
        let store = Self::default();
        store.insert_all(regions)?;
        Ok(store)
    }

    fn insert_all(&self, regions: Vec<Region>) -> Result<(), StorageError> {
        for region in regions {
            self.create(region)?;
        }
        Ok(())
    }
}

impl EntityStore for RegionStore {
    type Record = Region;
    type BackDependents = RegionBackDependents;
    type ForwardDependents = RegionForwardDependents;

    fn table(&self) -> &Table<Region> {
        &self.table
    }

    fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    fn back_dependents(&self, _region: &Region) -> Result<RegionBackDependents, StorageError> {
        Ok(RegionBackDependents {})
    }

    fn forward_dependents_of(&self, key: &str) -> Result<RegionForwardDependents, StorageError> {
        let registry = self.registry.get(self.kind())?;

        // `any` stops at the first matching price, so a commodity with several
        // observations in this region is listed once.
        let commodities = registry
            .commodities()
            .select_keys(|c| c.references_region(key))?;
        let processes = registry.processes().select_keys(|p| p.region == key)?;
        let agents = registry.agents().select_keys(|a| a.region == key)?;

        Ok(RegionForwardDependents {
            commodities,
            processes,
            agents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::record::StoreKind;

    #[test]
    fn region_store_crud() {
        let store = RegionStore::default();
        let r1 = store.create(Region::new("R1")).unwrap();
        assert_eq!(r1, Region::new("R1"));
        assert_eq!(store.read("R1").unwrap(), r1);

        let err = store.create(Region::new("R1")).unwrap_err();
        assert!(matches!(
            err,
            StorageError::KeyAlreadyExists { ref key, store: StoreKind::Region } if key == "R1"
        ));

        // The key is immutable; the stored value is whatever the caller passes.
        store.update("R1", Region::new("R1b")).unwrap();
        assert_eq!(store.read("R1").unwrap().name, "R1b");
        assert!(store.update("R2", Region::new("R2")).unwrap_err().is_key_not_found());
        assert!(store.read("R2").unwrap_err().is_key_not_found());
    }

    #[test]
    fn region_store_new_fails_fast_on_duplicates() {
        let err = RegionStore::new(vec![
            Region::new("R1"),
            Region::new("R2"),
            Region::new("R1"),
            Region::new("R3"),
        ])
        .unwrap_err();
        assert!(err.is_key_already_exists());
    }

    #[test]
    fn insert_stops_at_first_duplicate() {
        let store = RegionStore::default();
        store.create(Region::new("R1")).unwrap();

        let err = store
            .insert_all(vec![Region::new("R2"), Region::new("R1"), Region::new("R3")])
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::KeyAlreadyExists { ref key, store: StoreKind::Region } if key == "R1"
        ));
        assert!(store.contains("R2").unwrap());
        assert!(!store.contains("R3").unwrap());
        assert_eq!(store.keys().unwrap(), vec!["R1", "R2"]);
    }

    #[test]
    fn region_store_new_defaults_to_empty() {
        let store = RegionStore::new(Vec::new()).unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn region_back_dependents_always_empty() {
        let store = RegionStore::new(vec![Region::new("R1")]).unwrap();
        let back = store.back_dependents(&Region::new("R1")).unwrap();
        assert!(back.is_empty());
        assert_eq!(back, RegionBackDependents::default());
    }

    #[test]
    fn detached_region_store_cannot_scan_siblings() {
        let store = RegionStore::new(vec![Region::new("R1")]).unwrap();
        let err = store.forward_dependents_of("R1").unwrap_err();
        assert!(matches!(
            err,
            StorageError::RegistryUnavailable { store: StoreKind::Region }
        ));
        // A failed cascade scan leaves the record in place.
        assert!(store.delete("R1").is_err());
        assert!(store.contains("R1").unwrap());
    }

    #[test]
    fn forward_dependents_flatten_in_group_order() {
        let fwd = RegionForwardDependents {
            commodities: vec!["gas".to_string()],
            processes: vec!["boiler".to_string()],
            agents: vec!["A1".to_string(), "A2".to_string()],
        };
        assert_eq!(
            fwd.refs(),
            vec![
                RecordRef::commodity("gas"),
                RecordRef::process("boiler"),
                RecordRef::agent("A1"),
                RecordRef::agent("A2"),
            ]
        );
    }
}
