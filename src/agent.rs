//! Agents: investment decision makers operating within a region.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{validate_finite, validate_non_empty, ValidationError};
use crate::record::{Record, StoreKind};

/// How an agent invests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    /// Invests in new capacity.
    #[default]
    New,
    /// Replaces retiring capacity.
    Retrofit,
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Retrofit => write!(f, "retrofit"),
        }
    }
}

/// An agent, keyed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique agent name (the store key).
    pub name: String,
    /// Key of the region the agent operates in.
    pub region: String,
    /// Demand sector the agent invests for.
    #[serde(default)]
    pub sector: String,
    /// Investment behaviour.
    #[serde(default)]
    pub agent_type: AgentType,
    /// Fraction of the sector's demand this agent serves.
    #[serde(default = "default_share")]
    pub share: f64,
}

fn default_share() -> f64 {
    1.0
}

impl Agent {
    /// A new-capacity agent with a full share and no sector.
    #[must_use]
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            sector: String::new(),
            agent_type: AgentType::New,
            share: default_share(),
        }
    }

    /// Set the sector.
    #[must_use]
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = sector.into();
        self
    }

    /// Set the investment behaviour.
    #[must_use]
    pub fn with_type(mut self, agent_type: AgentType) -> Self {
        self.agent_type = agent_type;
        self
    }

    /// Set the demand share.
    #[must_use]
    pub fn with_share(mut self, share: f64) -> Self {
        self.share = share;
        self
    }
}

impl Record for Agent {
    const KIND: StoreKind = StoreKind::Agent;

    fn key(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_non_empty("name", &self.name)?;
        validate_non_empty("region", &self.region)?;
        validate_finite("share", self.share)?;
        if !(0.0..=1.0).contains(&self.share) {
            return Err(ValidationError::ShareOutOfRange { value: self.share });
        }
        Ok(())
    }
}
