//! Datastore configuration and seed data.

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::commodity::Commodity;
use crate::process::Process;
use crate::region::Region;
use crate::storage::traits::StorageError;

/// Configuration for a [`Datastore`](crate::storage::Datastore).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatastoreConfig {
    /// Reject `create`/`update` of a record whose back dependents are absent.
    pub enforce_back_dependents: bool,
    /// Run an integrity check over the seed once every store is attached.
    pub verify_seed: bool,
}

impl DatastoreConfig {
    /// Both checks on.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            enforce_back_dependents: true,
            verify_seed: true,
        }
    }
}

/// Initial records for every store.
///
/// Each field defaults to a freshly built empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatastoreSeed {
    /// Initial regions.
    pub regions: Vec<Region>,
    /// Initial commodities.
    pub commodities: Vec<Commodity>,
    /// Initial processes.
    pub processes: Vec<Process>,
    /// Initial agents.
    pub agents: Vec<Agent>,
}

impl DatastoreSeed {
    /// Parse a seed from JSON.
    ///
    /// # Errors
    /// `SerializationError` if the text is not a valid seed document.
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        serde_json::from_str(json).map_err(|e| StorageError::SerializationError(e.to_string()))
    }

    /// Append a region.
    #[must_use]
    pub fn with_region(mut self, region: Region) -> Self {
        self.regions.push(region);
        self
    }

    /// Append a commodity.
    #[must_use]
    pub fn with_commodity(mut self, commodity: Commodity) -> Self {
        self.commodities.push(commodity);
        self
    }

    /// Append a process.
    #[must_use]
    pub fn with_process(mut self, process: Process) -> Self {
        self.processes.push(process);
        self
    }

    /// Append an agent.
    #[must_use]
    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.agents.push(agent);
        self
    }

    /// Total number of records across all stores.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len() + self.commodities.len() + self.processes.len() + self.agents.len()
    }

    /// True if the seed holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
