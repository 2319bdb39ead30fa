//! Processes: technologies that turn input commodities into outputs within a region.

use serde::{Deserialize, Serialize};

use crate::error::{validate_non_empty, validate_non_negative, ValidationError};
use crate::record::{Record, StoreKind};

/// A commodity flow into or out of a process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    /// Key of the commodity flowing.
    pub commodity: String,
    /// Units of commodity per unit of activity.
    pub quantity: f64,
}

impl Flow {
    /// `quantity` units of `commodity`.
    #[must_use]
    pub fn new(commodity: impl Into<String>, quantity: f64) -> Self {
        Self {
            commodity: commodity.into(),
            quantity,
        }
    }
}

/// A process, keyed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    /// Unique process name (the store key).
    pub name: String,
    /// Key of the region the process is installed in.
    pub region: String,
    /// Sector the process serves.
    #[serde(default)]
    pub sector: String,
    /// Consumed commodities.
    #[serde(default)]
    pub inputs: Vec<Flow>,
    /// Produced commodities.
    #[serde(default)]
    pub outputs: Vec<Flow>,
}

impl Process {
    /// A process with no sector and no flows.
    #[must_use]
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            sector: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Set the sector.
    #[must_use]
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = sector.into();
        self
    }

    /// Add an input flow.
    #[must_use]
    pub fn with_input(mut self, flow: Flow) -> Self {
        self.inputs.push(flow);
        self
    }

    /// Add an output flow.
    #[must_use]
    pub fn with_output(mut self, flow: Flow) -> Self {
        self.outputs.push(flow);
        self
    }

    /// True if `commodity` appears among the inputs or outputs.
    #[must_use]
    pub fn uses_commodity(&self, commodity: &str) -> bool {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .any(|f| f.commodity == commodity)
    }

    /// Distinct commodity keys across inputs then outputs, in first-seen order.
    #[must_use]
    pub fn commodities(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for flow in self.inputs.iter().chain(self.outputs.iter()) {
            if !out.contains(&flow.commodity.as_str()) {
                out.push(&flow.commodity);
            }
        }
        out
    }
}

impl Record for Process {
    const KIND: StoreKind = StoreKind::Process;

    fn key(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_non_empty("name", &self.name)?;
        validate_non_empty("region", &self.region)?;
        for flow in self.inputs.iter().chain(self.outputs.iter()) {
            validate_non_empty("flow.commodity", &flow.commodity)?;
            validate_non_negative("flow.quantity", flow.quantity)?;
        }
        Ok(())
    }
}
