//! Regions: the root entity of a model.
//!
//! Every commodity price, process and agent is tagged with a region name, so
//! removing a region takes those records with it.

use serde::{Deserialize, Serialize};

use crate::error::{validate_non_empty, ValidationError};
use crate::record::{Record, StoreKind};

/// A geographic region.
///
/// # Examples
///
/// ```
/// use muse_datastore::Region;
///
/// let region = Region::new("R1");
/// assert_eq!(region.name, "R1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Unique region name (the store key).
    pub name: String,
}

impl Region {
    /// A region called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Record for Region {
    const KIND: StoreKind = StoreKind::Region;

    fn key(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_non_empty("name", &self.name)
    }
}
