//! `Entity` — the per-frame interface every kernel-ticked thing implements
//! (spec.md components C/D): person agents via [`crate::agent_entity::AgentEntity`]
//! and signals via [`crate::agent_entity::SignalEntity`].
//!
//! `WorkGroup<E>` is generic over `E: Entity` and gives each partition its
//! own `Vec<E>` rather than slicing one shared `Vec` — every entity's
//! mutable state lives inside the entity itself, so two workers ticking
//! disjoint partitions never alias, without any `unsafe`.

use tk_core::lifecycle::UpdateStatus;
use tk_core::{AgentId, Tick};
use tk_roles::SimContext;

pub trait Entity: Send {
    /// Stable identity, used for logging and [`crate::start_queue::StartQueue`] ordering.
    fn id(&self) -> AgentId;

    /// The tick this entity transitions `Pending` -> `Active`.
    fn start_tick(&self) -> Tick;

    /// `true` for entities excluded from the aura's spatial index (signals,
    /// communication relays). Default: spatial (person agents).
    fn is_non_spatial(&self) -> bool {
        false
    }

    /// Called exactly once, the frame this entity becomes `Active`.
    fn frame_init(&mut self, tick: Tick);

    /// Called once per frame while `Active`. `ctx` is the tick's read-only
    /// shared snapshot (rebuilt fresh every tick, never stored past the call).
    fn frame_tick(&mut self, tick: Tick, ctx: &SimContext<'_>) -> UpdateStatus;

    /// Optional per-frame side-channel emission (e.g. a completed trip-chain
    /// event, an output row). Default: nothing.
    fn frame_output(&mut self, _tick: Tick) {}
}
