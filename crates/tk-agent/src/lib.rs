//! `tk-agent` — double-buffered, Structure-of-Arrays agent storage for the
//! traffic kernel.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-------------------------------------------------------------|
//! | [`component`]   | `ComponentVec` trait, `TypedComponentVec<T>`, `ComponentMap` |
//! | [`store`]       | `AgentStore` (double-buffered SoA)                          |
//! | [`builder`]     | `AgentStoreBuilder` (fluent construction)                 |
//!
//! Position, lane, distance-on-segment, and queuing state live directly on
//! `AgentStore` as current/pending array pairs. Everything else
//! application-specific (trip chain, role, perception cache) is registered
//! through [`ComponentMap`].
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on all public types.      |

pub mod builder;
pub mod component;
pub mod store;

#[cfg(test)]
mod tests;

pub use builder::AgentStoreBuilder;
pub use component::{ComponentMap, ComponentVec, TypedComponentVec};
pub use store::AgentStore;
