//! Read-only simulation state passed to every role callback.

use tk_agent::AgentStore;
use tk_core::Tick;
use tk_mobility::MobilityStore;
use tk_schedule::TripChain;
use tk_spatial::{AuraManager, RoadNetwork};

/// A read-only snapshot of the simulation state passed to every
/// [`Role`][crate::Role] perceive/decide/move call.
///
/// `SimContext` is built once per tick by tk-sim and shared (immutably) across
/// all agent callbacks during the update phase. No heap allocation happens
/// between ticks: the same fields are rebuilt from borrows each tick.
///
/// # Lifetimes
///
/// All borrows live for the duration of one tick's update phase. tk-sim
/// never allows mutable access to these structures while `SimContext` is live.
/// `aura` reflects the *previous* tick's rebuild — spec.md §4.H: queries only
/// ever see positions published before the current tick's update phase.
pub struct SimContext<'a> {
    /// Current simulation tick.
    pub tick: Tick,

    /// How many wall-clock seconds one tick represents.
    pub tick_duration_secs: u32,

    /// Read-only view of every agent's SoA state arrays.
    pub agents: &'a AgentStore,

    /// The road network agents travel over.
    pub network: &'a RoadNetwork,

    /// Per-agent travel state and route cache.
    pub mobility: &'a MobilityStore,

    /// Spatial proximity index, rebuilt once per tick.
    pub aura: &'a dyn AuraManager,

    /// Per-agent trip chains, indexed by `AgentId`.
    pub trip_chains: &'a [TripChain],
}

impl<'a> SimContext<'a> {
    /// Build a new context for a single tick.
    #[inline]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tick: Tick,
        tick_duration_secs: u32,
        agents: &'a AgentStore,
        network: &'a RoadNetwork,
        mobility: &'a MobilityStore,
        aura: &'a dyn AuraManager,
        trip_chains: &'a [TripChain],
    ) -> Self {
        Self { tick, tick_duration_secs, agents, network, mobility, aura, trip_chains }
    }
}
