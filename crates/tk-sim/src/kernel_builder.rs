//! `KernelBuilder` — fluent construction of a [`Kernel`] from a
//! [`KernelConfig`] plus the agents and network a loader has already
//! assembled.

use tk_agent::AgentStore;
use tk_core::AgentId;
use tk_schedule::TripChain;
use tk_signal::Signal;
use tk_spatial::{AuraManager, RoadNetwork, Router};

use crate::agent_entity::AgentEntity;
use crate::config::KernelConfig;
use crate::error::SimResult;
use crate::kernel::Kernel;

/// Builds a [`Kernel<R>`] from a [`KernelConfig`] plus the entities and
/// network a loader has already constructed.
///
/// Every input is required: the kernel has no implicit "empty network, no
/// agents" fallback, since `KernelConfig::network_source` already commits to
/// a concrete network the caller must have loaded.
pub struct KernelBuilder<R: Router> {
    config: KernelConfig,
    agent_store: AgentStore,
    network: RoadNetwork,
    router: R,
    trip_chains: Vec<TripChain>,
    agent_entities: Vec<AgentEntity>,
    signals: Vec<(AgentId, Signal)>,
}

impl<R: Router> KernelBuilder<R> {
    pub fn new(
        config: KernelConfig,
        agent_store: AgentStore,
        network: RoadNetwork,
        router: R,
        trip_chains: Vec<TripChain>,
        agent_entities: Vec<AgentEntity>,
    ) -> Self {
        Self {
            config,
            agent_store,
            network,
            router,
            trip_chains,
            agent_entities,
            signals: Vec::new(),
        }
    }

    /// Register a signal to be added to the kernel's signal work group after
    /// construction, keyed by a synthetic `AgentId` distinct from the person
    /// population's id space.
    pub fn with_signal(mut self, synthetic_id: AgentId, signal: Signal) -> Self {
        self.signals.push((synthetic_id, signal));
        self
    }

    /// Supply an already-built aura backend, overriding
    /// `KernelConfig::aura_backend`'s default construction. Useful for tests
    /// that want a backend with non-default tuning parameters.
    pub fn build_with_aura(self, aura: Box<dyn AuraManager>) -> SimResult<Kernel<R>> {
        self.config.validate()?;
        let tick_duration_ms = self.config.sim.tick_duration_millis;
        let mut kernel = Kernel::new(
            self.config.sim,
            self.config.assignment_strategy,
            self.config.granularity,
            self.agent_store,
            self.network,
            self.router,
            aura,
            self.trip_chains,
            self.agent_entities,
        )?;
        for (id, signal) in self.signals {
            kernel.add_signal(id, tick_duration_ms, signal);
        }
        Ok(kernel)
    }

    /// Validate `config` and build the kernel, constructing the aura backend
    /// from `config.aura_backend`.
    pub fn build(self) -> SimResult<Kernel<R>> {
        let aura = self.config.aura_backend.build();
        self.build_with_aura(aura)
    }
}
