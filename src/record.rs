//! Record identity shared by every store.
//!
//! A record is addressed by its natural key (a non-empty name) within the
//! store for its type. Across the registry it is addressed by a
//! [`RecordRef`], the pair of its [`StoreKind`] and key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The entity type a store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Geographic region (root type).
    Region,
    /// Traded or emitted commodity.
    Commodity,
    /// Technology converting commodities within a region.
    Process,
    /// Investment agent operating within a region.
    Agent,
}

impl StoreKind {
    /// All kinds, roots first.
    pub const ALL: [StoreKind; 4] = [Self::Region, Self::Commodity, Self::Process, Self::Agent];

    /// Lowercase store name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::Commodity => "commodity",
            Self::Process => "process",
            Self::Agent => "agent",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to one record anywhere in the registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    /// Store the record lives in.
    pub kind: StoreKind,
    /// Key within that store.
    pub key: String,
}

impl RecordRef {
    /// A reference to `key` in the `kind` store.
    #[must_use]
    pub fn new(kind: StoreKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }

    /// A region reference.
    #[must_use]
    pub fn region(key: impl Into<String>) -> Self {
        Self::new(StoreKind::Region, key)
    }

    /// A commodity reference.
    #[must_use]
    pub fn commodity(key: impl Into<String>) -> Self {
        Self::new(StoreKind::Commodity, key)
    }

    /// A process reference.
    #[must_use]
    pub fn process(key: impl Into<String>) -> Self {
        Self::new(StoreKind::Process, key)
    }

    /// An agent reference.
    #[must_use]
    pub fn agent(key: impl Into<String>) -> Self {
        Self::new(StoreKind::Agent, key)
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.key)
    }
}

/// A value object that can live in a store.
///
/// Implementors are plain data; behaviour beyond structural validation
/// belongs to the store for their kind.
pub trait Record: Clone + fmt::Debug + Send + Sync + 'static {
    /// The store this record type lives in.
    const KIND: StoreKind;

    /// The natural key. Immutable for the life of the record.
    fn key(&self) -> &str;

    /// Structural validation. Stores call this before any mutation.
    ///
    /// # Errors
    /// Returns the first field-level problem found.
    fn validate(&self) -> Result<(), ValidationError>;

    /// This record as a registry-wide reference.
    fn record_ref(&self) -> RecordRef {
        RecordRef::new(Self::KIND, self.key())
    }
}
