//! Process store.

use crate::process::Process;
use crate::record::RecordRef;
use crate::storage::memory::Table;
use crate::storage::registry::RegistryHandle;
use crate::storage::traits::{Dependents, EntityStore, StorageError};

/// The region a process sits in and the commodities it moves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessBackDependents {
    /// Region key (exactly one).
    pub regions: Vec<String>,
    /// Commodity keys across inputs then outputs, no repeats.
    pub commodities: Vec<String>,
}

impl Dependents for ProcessBackDependents {
    fn refs(&self) -> Vec<RecordRef> {
        self.regions
            .iter()
            .map(RecordRef::region)
            .chain(self.commodities.iter().map(RecordRef::commodity))
            .collect()
    }
}

/// Nothing in the model references a process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessForwardDependents {}

impl Dependents for ProcessForwardDependents {
    fn refs(&self) -> Vec<RecordRef> {
        Vec::new()
    }
}

/// Keyed store of [`Process`] records.
#[derive(Debug, Default)]
pub struct ProcessStore {
    table: Table<Process>,
    registry: RegistryHandle,
}

impl ProcessStore {
    /// Build a store holding `processes`, inserted in order through `create`.
    ///
    /// # Errors
    /// Fails on the first invalid or duplicate process.
    pub fn new(processes: Vec<Process>) -> Result<Self, StorageError> {
        let store = Self::default();
        for process in processes {
            store.create(process)?;
        }
        Ok(store)
    }
}

impl EntityStore for ProcessStore {
    type Record = Process;
    type BackDependents = ProcessBackDependents;
    type ForwardDependents = ProcessForwardDependents;

    fn table(&self) -> &Table<Process> {
        &self.table
    }

    fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    fn back_dependents(&self, process: &Process) -> Result<ProcessBackDependents, StorageError> {
        Ok(ProcessBackDependents {
            regions: vec![process.region.clone()],
            commodities: process
                .commodities()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
    }

    fn forward_dependents_of(&self, _key: &str) -> Result<ProcessForwardDependents, StorageError> {
        Ok(ProcessForwardDependents {})
    }
}
