//! Store registry.
//!
//! [`Datastore`] owns one store per entity type and is the only way stores
//! reach each other. Stores are built independently, then the registry is
//! placed in an `Arc` and each store receives a weak handle to it, so there
//! is neither a global singleton nor a reference cycle.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock, Weak};

use tracing::{info, warn};

use crate::record::{RecordRef, StoreKind};
use crate::storage::agent::AgentStore;
use crate::storage::commodity::CommodityStore;
use crate::storage::config::{DatastoreConfig, DatastoreSeed};
use crate::storage::process::ProcessStore;
use crate::storage::region::RegionStore;
use crate::storage::traits::{Dependents, EntityStore, StorageError};

/// A store's link back to its registry.
///
/// Unattached until the registry wires it up; after the registry is dropped
/// every cross-store call fails with `RegistryUnavailable`.
#[derive(Debug, Default)]
pub struct RegistryHandle {
    registry: OnceLock<Weak<Datastore>>,
}

impl RegistryHandle {
    pub(crate) fn attach(&self, registry: &Arc<Datastore>, store: StoreKind) -> Result<(), StorageError> {
        self.registry.set(Arc::downgrade(registry)).map_err(|_| {
            StorageError::BackendError(format!("{store} store is already attached to a registry"))
        })
    }

    /// The registry, if attached and still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Arc<Datastore>> {
        self.registry.get().and_then(Weak::upgrade)
    }

    /// True while the registry is attached and alive.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.upgrade().is_some()
    }

    /// The registry on behalf of `store`.
    ///
    /// # Errors
    /// `RegistryUnavailable` if not attached or already dropped.
    pub fn get(&self, store: StoreKind) -> Result<Arc<Datastore>, StorageError> {
        self.upgrade().ok_or(StorageError::RegistryUnavailable { store })
    }
}

/// A back dependent that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// The record holding the reference.
    pub source: RecordRef,
    /// The record it references.
    pub missing: RecordRef,
}

/// Registry of all entity stores for one session.
///
/// # Example
///
/// ```
/// use muse_datastore::{Datastore, DatastoreConfig, DatastoreSeed, EntityStore, Process, Region};
///
/// let seed = DatastoreSeed::default()
///     .with_region(Region::new("R1"))
///     .with_process(Process::new("P1", "R1"));
/// let ds = Datastore::with_seed(seed, DatastoreConfig::default()).unwrap();
///
/// ds.regions().delete("R1").unwrap();
/// assert!(ds.processes().read("P1").unwrap_err().is_key_not_found());
/// ```
#[derive(Debug)]
pub struct Datastore {
    config: DatastoreConfig,
    regions: RegionStore,
    commodities: CommodityStore,
    processes: ProcessStore,
    agents: AgentStore,
}

impl Datastore {
    /// An empty registry.
    ///
    /// # Errors
    /// Only on an internal wiring failure.
    pub fn new(config: DatastoreConfig) -> Result<Arc<Self>, StorageError> {
        Self::with_seed(DatastoreSeed::default(), config)
    }

    /// A registry holding `seed`.
    ///
    /// Each store is filled through its own `create`, so a duplicate key
    /// anywhere in the seed fails construction. Back dependents are not
    /// enforced while seeding (no store is attached yet); set
    /// [`DatastoreConfig::verify_seed`] to check them afterwards.
    ///
    /// # Errors
    /// - `KeyAlreadyExists` / `Validation` from seeding
    /// - `MissingDependency` if `verify_seed` is set and a reference dangles
    pub fn with_seed(seed: DatastoreSeed, config: DatastoreConfig) -> Result<Arc<Self>, StorageError> {
        let DatastoreSeed {
            regions,
            commodities,
            processes,
            agents,
        } = seed;

        let registry = Arc::new(Self {
            config,
            regions: RegionStore::new(regions)?,
            commodities: CommodityStore::new(commodities)?,
            processes: ProcessStore::new(processes)?,
            agents: AgentStore::new(agents)?,
        });

        registry.regions.registry().attach(&registry, StoreKind::Region)?;
        registry.commodities.registry().attach(&registry, StoreKind::Commodity)?;
        registry.processes.registry().attach(&registry, StoreKind::Process)?;
        registry.agents.registry().attach(&registry, StoreKind::Agent)?;

        info!(
            regions = registry.regions.len()?,
            commodities = registry.commodities.len()?,
            processes = registry.processes.len()?,
            agents = registry.agents.len()?,
            "datastore ready"
        );

        if registry.config.verify_seed {
            registry.check_integrity()?;
        }

        Ok(registry)
    }

    /// Settings this registry was built with.
    #[must_use]
    pub fn config(&self) -> &DatastoreConfig {
        &self.config
    }

    /// The region store.
    #[must_use]
    pub fn regions(&self) -> &RegionStore {
        &self.regions
    }

    /// The commodity store.
    #[must_use]
    pub fn commodities(&self) -> &CommodityStore {
        &self.commodities
    }

    /// The process store.
    #[must_use]
    pub fn processes(&self) -> &ProcessStore {
        &self.processes
    }

    /// The agent store.
    #[must_use]
    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    /// Number of records across every store.
    ///
    /// # Errors
    /// `BackendError` on a poisoned lock.
    pub fn record_count(&self) -> Result<usize, StorageError> {
        Ok(self.regions.len()?
            + self.commodities.len()?
            + self.processes.len()?
            + self.agents.len()?)
    }

    /// True if `record` is stored.
    ///
    /// # Errors
    /// `BackendError` on a poisoned lock.
    pub fn contains(&self, record: &RecordRef) -> Result<bool, StorageError> {
        match record.kind {
            StoreKind::Region => self.regions.contains(&record.key),
            StoreKind::Commodity => self.commodities.contains(&record.key),
            StoreKind::Process => self.processes.contains(&record.key),
            StoreKind::Agent => self.agents.contains(&record.key),
        }
    }

    /// Delete `record` from its store, cascading as that store does.
    ///
    /// # Errors
    /// As for [`EntityStore::delete`].
    pub fn delete_record(&self, record: &RecordRef) -> Result<(), StorageError> {
        match record.kind {
            StoreKind::Region => self.regions.delete(&record.key),
            StoreKind::Commodity => self.commodities.delete(&record.key),
            StoreKind::Process => self.processes.delete(&record.key),
            StoreKind::Agent => self.agents.delete(&record.key),
        }
    }

    /// Forward dependents of `record`, flattened.
    ///
    /// # Errors
    /// `KeyNotFound` if `record` is absent.
    pub fn forward_refs(&self, record: &RecordRef) -> Result<Vec<RecordRef>, StorageError> {
        match record.kind {
            StoreKind::Region => forward_refs_in(&self.regions, &record.key),
            StoreKind::Commodity => forward_refs_in(&self.commodities, &record.key),
            StoreKind::Process => forward_refs_in(&self.processes, &record.key),
            StoreKind::Agent => forward_refs_in(&self.agents, &record.key),
        }
    }

    /// Back dependents of `record`, flattened.
    ///
    /// # Errors
    /// `KeyNotFound` if `record` is absent.
    pub fn back_refs(&self, record: &RecordRef) -> Result<Vec<RecordRef>, StorageError> {
        match record.kind {
            StoreKind::Region => back_refs_in(&self.regions, &record.key),
            StoreKind::Commodity => back_refs_in(&self.commodities, &record.key),
            StoreKind::Process => back_refs_in(&self.processes, &record.key),
            StoreKind::Agent => back_refs_in(&self.agents, &record.key),
        }
    }

    /// Every record deleting `root` would remove, without removing anything.
    ///
    /// Ordered the way the cascade runs: each record's dependents come before
    /// it, `root` is last, and nothing is listed twice. A caller wanting an
    /// all-or-nothing delete can inspect this before committing.
    ///
    /// # Errors
    /// `KeyNotFound` if `root` is absent.
    pub fn delete_plan(&self, root: &RecordRef) -> Result<Vec<RecordRef>, StorageError> {
        let mut plan = Vec::new();
        let mut seen = HashSet::new();
        self.plan_into(root, &mut seen, &mut plan)?;
        Ok(plan)
    }

    fn plan_into(
        &self,
        record: &RecordRef,
        seen: &mut HashSet<RecordRef>,
        plan: &mut Vec<RecordRef>,
    ) -> Result<(), StorageError> {
        if !seen.insert(record.clone()) {
            return Ok(());
        }
        for dependent in self.forward_refs(record)? {
            self.plan_into(&dependent, seen, plan)?;
        }
        plan.push(record.clone());
        Ok(())
    }

    /// Every back dependent, across all stores, that does not exist.
    ///
    /// # Errors
    /// `BackendError` on a poisoned lock.
    pub fn dangling_references(&self) -> Result<Vec<DanglingReference>, StorageError> {
        let mut out = Vec::new();
        self.dangling_in(&self.regions, &mut out)?;
        self.dangling_in(&self.commodities, &mut out)?;
        self.dangling_in(&self.processes, &mut out)?;
        self.dangling_in(&self.agents, &mut out)?;
        Ok(out)
    }

    /// Fail if any back dependent is missing.
    ///
    /// # Errors
    /// `MissingDependency` naming the first dangling reference found.
    pub fn check_integrity(&self) -> Result<(), StorageError> {
        let dangling = self.dangling_references()?;
        for d in &dangling {
            warn!(source = %d.source, missing = %d.missing, "dangling reference");
        }
        match dangling.into_iter().next() {
            None => Ok(()),
            Some(DanglingReference { source, missing }) => Err(StorageError::MissingDependency {
                key: source.key,
                store: source.kind,
                dependency: missing,
            }),
        }
    }

    fn dangling_in<S: EntityStore>(
        &self,
        store: &S,
        out: &mut Vec<DanglingReference>,
    ) -> Result<(), StorageError> {
        for (key, record) in store.records()? {
            for missing in store.back_dependents(&record)?.refs() {
                if !self.contains(&missing)? {
                    out.push(DanglingReference {
                        source: RecordRef::new(store.kind(), key.clone()),
                        missing,
                    });
                }
            }
        }
        Ok(())
    }
}

fn forward_refs_in<S: EntityStore>(store: &S, key: &str) -> Result<Vec<RecordRef>, StorageError> {
    if !store.contains(key)? {
        return Err(store.table().not_found(key));
    }
    Ok(store.forward_dependents_of(key)?.refs())
}

fn back_refs_in<S: EntityStore>(store: &S, key: &str) -> Result<Vec<RecordRef>, StorageError> {
    let record = store.read(key)?;
    Ok(store.back_dependents(&record)?.refs())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::agent::Agent;
    use crate::commodity::{Commodity, CommodityPrice, CommodityType};
    use crate::process::{Flow, Process};
    use crate::region::Region;

    fn seeded() -> Arc<Datastore> {
        let seed = DatastoreSeed::default()
            .with_region(Region::new("R1"))
            .with_region(Region::new("R2"))
            .with_commodity(
                Commodity::new("gas", CommodityType::Energy)
                    .with_price(CommodityPrice::new("R1", 2020, 10.0))
                    .with_price(CommodityPrice::new("R1", 2025, 12.0))
                    .with_price(CommodityPrice::new("R2", 2020, 9.0)),
            )
            .with_commodity(
                Commodity::new("heat", CommodityType::Energy)
                    .with_price(CommodityPrice::new("R2", 2020, 3.0)),
            )
            .with_process(
                Process::new("boiler", "R2")
                    .with_input(Flow::new("gas", 1.2))
                    .with_output(Flow::new("heat", 1.0)),
            )
            .with_process(Process::new("heatpump", "R1").with_output(Flow::new("heat", 1.0)))
            .with_agent(Agent::new("A1", "R1"))
            .with_agent(Agent::new("A2", "R2"));
        Datastore::with_seed(seed, DatastoreConfig::default()).unwrap()
    }

    #[test]
    fn stores_are_attached_after_construction() {
        let ds = seeded();
        assert!(ds.regions().registry().is_attached());
        assert!(ds.agents().registry().is_attached());
        assert_eq!(ds.record_count().unwrap(), 8);
    }

    #[test]
    fn region_forward_dependents_deduplicated() {
        let ds = seeded();
        let r1 = ds.regions().read("R1").unwrap();
        let fwd = ds.regions().forward_dependents(&r1).unwrap();
        assert_eq!(fwd.commodities, vec!["gas"]);
        assert_eq!(fwd.processes, vec!["heatpump"]);
        assert_eq!(fwd.agents, vec!["A1"]);
    }

    #[test]
    fn forward_and_back_refs_dispatch_by_kind() {
        let ds = seeded();
        assert_eq!(
            ds.forward_refs(&RecordRef::commodity("heat")).unwrap(),
            vec![RecordRef::process("boiler"), RecordRef::process("heatpump")]
        );
        assert_eq!(
            ds.back_refs(&RecordRef::process("boiler")).unwrap(),
            vec![
                RecordRef::region("R2"),
                RecordRef::commodity("gas"),
                RecordRef::commodity("heat"),
            ]
        );
        assert!(ds
            .forward_refs(&RecordRef::agent("nope"))
            .unwrap_err()
            .is_key_not_found());
    }

    #[test]
    fn delete_plan_is_dependents_first_and_mutates_nothing() {
        let ds = seeded();
        let plan = ds.delete_plan(&RecordRef::region("R1")).unwrap();
        assert_eq!(
            plan,
            vec![
                RecordRef::process("boiler"),
                RecordRef::commodity("gas"),
                RecordRef::process("heatpump"),
                RecordRef::agent("A1"),
                RecordRef::region("R1"),
            ]
        );
        assert_eq!(ds.record_count().unwrap(), 8);
    }

    #[test]
    fn delete_plan_matches_what_delete_removes() {
        let ds = seeded();
        let plan = ds.delete_plan(&RecordRef::region("R1")).unwrap();
        ds.delete_record(&RecordRef::region("R1")).unwrap();
        for record in &plan {
            assert!(!ds.contains(record).unwrap(), "{record} should be gone");
        }
        assert_eq!(ds.record_count().unwrap(), 8 - plan.len());
    }

    #[test]
    fn delete_plan_follows_the_key_after_a_rename() {
        let ds = seeded();
        let before = ds.delete_plan(&RecordRef::region("R1")).unwrap();

        ds.regions().update("R1", Region::new("R1-renamed")).unwrap();
        assert_eq!(ds.delete_plan(&RecordRef::region("R1")).unwrap(), before);

        ds.delete_record(&RecordRef::region("R1")).unwrap();
        assert!(!ds.processes().contains("heatpump").unwrap());
        assert!(!ds.agents().contains("A1").unwrap());
        assert!(ds.dangling_references().unwrap().is_empty());
    }

    #[test]
    fn nested_delete_error_propagates_and_keeps_root() {
        // The commodity store is never attached, so the cascade into it fails
        // with something other than KeyNotFound.
        let ds = Arc::new(Datastore {
            config: DatastoreConfig::default(),
            regions: RegionStore::new(vec![Region::new("R1")]).unwrap(),
            commodities: CommodityStore::new(vec![Commodity::new("gas", CommodityType::Energy)
                .with_price(CommodityPrice::new("R1", 2020, 10.0))])
            .unwrap(),
            processes: ProcessStore::new(vec![Process::new("heatpump", "R1")]).unwrap(),
            agents: AgentStore::new(vec![Agent::new("A1", "R1")]).unwrap(),
        });
        ds.regions.registry().attach(&ds, StoreKind::Region).unwrap();
        ds.processes.registry().attach(&ds, StoreKind::Process).unwrap();
        ds.agents.registry().attach(&ds, StoreKind::Agent).unwrap();

        let err = ds.regions().delete("R1").unwrap_err();
        assert!(matches!(
            err,
            StorageError::RegistryUnavailable { store: StoreKind::Commodity }
        ));

        // The cascade stops at the failing dependent: the root and every
        // sibling after it are untouched.
        assert!(ds.regions().contains("R1").unwrap());
        assert!(ds.commodities().contains("gas").unwrap());
        assert!(ds.processes().contains("heatpump").unwrap());
        assert!(ds.agents().contains("A1").unwrap());
    }

    #[test]
    fn delete_plan_of_missing_root_fails() {
        let ds = seeded();
        assert!(ds
            .delete_plan(&RecordRef::region("R9"))
            .unwrap_err()
            .is_key_not_found());
    }

    #[test]
    fn integrity_reports_dangling_references() {
        let ds = seeded();
        assert!(ds.check_integrity().is_ok());

        ds.agents().create(Agent::new("A3", "R9")).unwrap();
        let dangling = ds.dangling_references().unwrap();
        assert_eq!(
            dangling,
            vec![DanglingReference {
                source: RecordRef::agent("A3"),
                missing: RecordRef::region("R9"),
            }]
        );
        assert!(matches!(
            ds.check_integrity(),
            Err(StorageError::MissingDependency { ref key, store: StoreKind::Agent, .. }) if key == "A3"
        ));
    }

    #[test]
    fn dangling_reference_names_the_table_key() {
        let ds = seeded();
        ds.agents().create(Agent::new("A3", "R9")).unwrap();
        ds.agents().update("A3", Agent::new("A3-renamed", "R9")).unwrap();

        let dangling = ds.dangling_references().unwrap();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].source, RecordRef::agent("A3"));
    }

    #[test]
    fn attach_twice_is_rejected() {
        let ds = seeded();
        let err = ds
            .regions()
            .registry()
            .attach(&ds, StoreKind::Region)
            .unwrap_err();
        assert!(matches!(err, StorageError::BackendError(_)));
    }
}
