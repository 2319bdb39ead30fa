//! # muse-datastore
//!
//! In-memory, referential-integrity-aware storage for energy-system models.
//!
//! Regions, commodities, processes and agents each live in their own keyed
//! store. Stores are cross-linked through a [`Datastore`] registry: every
//! store can say what depends on a record (forward dependents) and what a
//! record depends on (back dependents), and deleting a record first deletes
//! everything that depends on it.
//!
//! ## Core Concepts
//!
//! - **Record**: a plain value with a unique string key ([`Region`], [`Commodity`], ...)
//! - **Store**: keyed CRUD for one record type ([`EntityStore`])
//! - **Dependents**: per-type descriptors of cross-store references ([`Dependents`])
//! - **Registry**: the [`Datastore`] through which stores reach each other
//!
//! ## Usage
//!
//! ```rust
//! use muse_datastore::{
//!     Commodity, CommodityPrice, CommodityType, Datastore, DatastoreConfig, DatastoreSeed,
//!     EntityStore, Process, Region,
//! };
//!
//! let seed = DatastoreSeed::default()
//!     .with_region(Region::new("R1"))
//!     .with_commodity(
//!         Commodity::new("C1", CommodityType::Energy)
//!             .with_price(CommodityPrice::new("R1", 0, 10.0)),
//!     )
//!     .with_process(Process::new("P1", "R1"));
//! let ds = Datastore::with_seed(seed, DatastoreConfig::default())?;
//!
//! ds.regions().delete("R1")?;
//! assert!(ds.regions().is_empty()?);
//! assert!(!ds.commodities().contains("C1")?);
//! assert!(!ds.processes().contains("P1")?);
//! # Ok::<(), muse_datastore::StorageError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Records
pub mod agent;
pub mod commodity;
pub mod error;
pub mod process;
pub mod record;
pub mod region;

// Stores and registry
pub mod storage;

// Re-export primary types at crate root for convenience
pub use agent::{Agent, AgentType};
pub use commodity::{Commodity, CommodityPrice, CommodityType};
pub use error::ValidationError;
pub use process::{Flow, Process};
pub use record::{Record, RecordRef, StoreKind};
pub use region::Region;

pub use storage::{
    AgentBackDependents, AgentForwardDependents, AgentStore, CommodityBackDependents,
    CommodityForwardDependents, CommodityStore, DanglingReference, Datastore, DatastoreConfig,
    DatastoreSeed, Dependents, EntityStore, ProcessBackDependents, ProcessForwardDependents,
    ProcessStore, RegionBackDependents, RegionForwardDependents, RegionStore, RegistryHandle,
    StorageError, Table,
};
