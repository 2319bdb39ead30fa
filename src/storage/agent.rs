//! Agent store.

use crate::agent::Agent;
use crate::record::RecordRef;
use crate::storage::memory::Table;
use crate::storage::registry::RegistryHandle;
use crate::storage::traits::{Dependents, EntityStore, StorageError};

/// The region an agent operates in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentBackDependents {
    /// Region keys (exactly one).
    pub regions: Vec<String>,
}

impl Dependents for AgentBackDependents {
    fn refs(&self) -> Vec<RecordRef> {
        self.regions.iter().map(RecordRef::region).collect()
    }
}

/// Nothing in the model references an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentForwardDependents {}

impl Dependents for AgentForwardDependents {
    fn refs(&self) -> Vec<RecordRef> {
        Vec::new()
    }
}

/// Keyed store of [`Agent`] records.
#[derive(Debug, Default)]
pub struct AgentStore {
    table: Table<Agent>,
    registry: RegistryHandle,
}

impl AgentStore {
    /// Build a store holding `agents`, inserted in order through `create`.
    ///
    /// # Errors
    /// Fails on the first invalid or duplicate agent.
    pub fn new(agents: Vec<Agent>) -> Result<Self, StorageError> {
        let store = Self::default();
        for agent in agents {
            store.create(agent)?;
        }
        Ok(store)
    }
}

impl EntityStore for AgentStore {
    type Record = Agent;
    type BackDependents = AgentBackDependents;
    type ForwardDependents = AgentForwardDependents;

    fn table(&self) -> &Table<Agent> {
        &self.table
    }

    fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    fn back_dependents(&self, agent: &Agent) -> Result<AgentBackDependents, StorageError> {
        Ok(AgentBackDependents {
            regions: vec![agent.region.clone()],
        })
    }

    fn forward_dependents_of(&self, _key: &str) -> Result<AgentForwardDependents, StorageError> {
        Ok(AgentForwardDependents {})
    }
}
