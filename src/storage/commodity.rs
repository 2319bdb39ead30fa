//! Commodity store.

use crate::commodity::Commodity;
use crate::record::RecordRef;
use crate::storage::memory::Table;
use crate::storage::registry::RegistryHandle;
use crate::storage::traits::{Dependents, EntityStore, StorageError};

/// Regions named by the commodity's price series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommodityBackDependents {
    /// Region keys, first-seen order, no repeats.
    pub regions: Vec<String>,
}

impl Dependents for CommodityBackDependents {
    fn refs(&self) -> Vec<RecordRef> {
        self.regions.iter().map(RecordRef::region).collect()
    }
}

/// Processes consuming or producing the commodity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommodityForwardDependents {
    /// Process keys.
    pub processes: Vec<String>,
}

impl Dependents for CommodityForwardDependents {
    fn refs(&self) -> Vec<RecordRef> {
        self.processes.iter().map(RecordRef::process).collect()
    }
}

/// Keyed store of [`Commodity`] records.
#[derive(Debug, Default)]
pub struct CommodityStore {
    table: Table<Commodity>,
    registry: RegistryHandle,
}

impl CommodityStore {
    /// Build a store holding `commodities`, inserted in order through `create`.
    ///
    /// # Errors
    /// Fails on the first invalid or duplicate commodity.
    pub fn new(commodities: Vec<Commodity>) -> Result<Self, StorageError> {
        let store = Self::default();
        for commodity in commodities {
            store.create(commodity)?;
        }
        Ok(store)
    }
}

impl EntityStore for CommodityStore {
    type Record = Commodity;
    type BackDependents = CommodityBackDependents;
    type ForwardDependents = CommodityForwardDependents;

    fn table(&self) -> &Table<Commodity> {
        &self.table
    }

    fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    fn back_dependents(&self, commodity: &Commodity) -> Result<CommodityBackDependents, StorageError> {
        Ok(CommodityBackDependents {
            regions: commodity
                .price_regions()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
    }

    fn forward_dependents_of(&self, key: &str) -> Result<CommodityForwardDependents, StorageError> {
        let registry = self.registry.get(self.kind())?;
        Ok(CommodityForwardDependents {
            processes: registry.processes().select_keys(|p| p.uses_commodity(key))?,
        })
    }
}
