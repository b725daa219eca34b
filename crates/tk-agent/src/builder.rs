//! Fluent builder for constructing an `AgentStore` in one step.
//!
//! # Usage
//!
//! ```rust
//! use tk_agent::AgentStoreBuilder;
//!
//! #[derive(Default)]
//! struct HealthState { infected: bool }
//!
//! let mut store = AgentStoreBuilder::new(10_000)
//!     .register_component::<HealthState>()
//!     .build();
//!
//! assert_eq!(store.count, 10_000);
//!
//! // Fill in actual values from CSV / shapefiles after building.
//! // (All arrays start at sentinel / Default values.)
//! ```

use crate::{AgentStore, ComponentMap};

/// Fluent builder for [`AgentStore`].
///
/// All arrays are pre-allocated at construction time so later field writes
/// (from CSV loaders, etc.) are simple indexed assignments, not pushes.
pub struct AgentStoreBuilder {
    count: usize,
    components: ComponentMap,
}

impl AgentStoreBuilder {
    /// Create a builder for `count` agents.
    ///
    /// `count` is typically the number of rows in the population CSV.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            components: ComponentMap::new(),
        }
    }

    /// Register an application-defined component type `T`.
    ///
    /// Every agent will start with `T::default()`.  Must be called before
    /// [`build`](Self::build) — components cannot be added after the store
    /// is constructed.
    ///
    /// Calling this twice for the same `T` is harmless (second call is a
    /// no-op).
    pub fn register_component<T: Default + Send + Sync + 'static>(mut self) -> Self {
        // Register with count=0; build() fills defaults in one batch pass.
        self.components.register::<T>(0);
        self
    }

    /// Construct the `AgentStore`.
    ///
    /// All SoA arrays are allocated and filled with sentinel / `Default`
    /// values.  Applications write actual initial state (from CSV, etc.)
    /// directly to the `pub` fields of the returned `AgentStore`.
    pub fn build(mut self) -> AgentStore {
        // Push T::default() once per agent for every registered component.
        for _ in 0..self.count {
            self.components.push_defaults();
        }

        AgentStore::new(self.count, self.components)
    }
}
