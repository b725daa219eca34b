//! `tk-sim` — barrier-synchronized tick kernel for the traffic kernel framework.
//!
//! # Per-tick phases
//!
//! ```text
//! for tick in 0..config.sim.total_ticks:
//!   ① deliver   — messages posted last tick reach their recipients
//!   ② update    — every WorkGroup's workers call Entity::update against a
//!                 read-only SimContext, in parallel, one partition per
//!                 worker thread
//!   ③ apply     — intents are applied in ascending id order: travel begins,
//!                 messages are queued for next-tick delivery
//!   ④ flip      — buffered cells publish their pending value; signals flip
//!   ⑤ rebuild   — the aura manager is rebuilt from post-flip positions
//!   ⑥ manage    — finished agents are retired; newly eligible agents join
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tk_sim::KernelBuilder;
//! use tk_spatial::{AuraBackend, DijkstraRouter};
//!
//! let mut kernel = KernelBuilder::new(config, store, network, DijkstraRouter)
//!     .build()?;
//! kernel.run()?;
//! ```

pub mod agent_entity;
pub mod config;
pub mod entity;
pub mod kernel;
pub mod kernel_builder;
pub mod shared;
pub mod start_queue;
pub mod worker;
pub mod workgroup;

pub mod error;

#[cfg(test)]
mod kernel_tests;

pub use agent_entity::{AgentEntity, SignalEntity};
pub use config::{GroupGranularity, KernelConfig, NetworkSource};
pub use entity::Entity;
pub use error::{abort_fatal, SimError, SimResult};
pub use kernel::Kernel;
pub use kernel_builder::KernelBuilder;
pub use shared::{FlipGroup, SharedDataManager};
pub use start_queue::StartQueue;
pub use workgroup::{PartitionStrategy, WorkGroup};
