//! Entity stores and the registry linking them.
//!
//! ```text
//!            Datastore (registry)
//!   ┌──────────┬──────────┬──────────┐
//!   │          │          │          │
//! Region   Commodity   Process    Agent
//!  Store     Store      Store     Store
//!   │  ▲       │  ▲       ▲         ▲
//!   │  └─weak──┴──┴─weak──┴──weak───┘
//!   └── cascade: region ─▶ commodity ─▶ process
//!                region ─▶ process, agent
//! ```

mod agent;
mod commodity;
mod config;
mod memory;
mod process;
mod region;
mod registry;
mod traits;

pub use agent::{AgentBackDependents, AgentForwardDependents, AgentStore};
pub use commodity::{CommodityBackDependents, CommodityForwardDependents, CommodityStore};
pub use config::{DatastoreConfig, DatastoreSeed};
pub use memory::Table;
pub use process::{ProcessBackDependents, ProcessForwardDependents, ProcessStore};
pub use region::{RegionBackDependents, RegionForwardDependents, RegionStore};
pub use registry::{DanglingReference, Datastore, RegistryHandle};
pub use traits::{Dependents, EntityStore, StorageError};
