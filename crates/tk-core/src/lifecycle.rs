//! Entity lifecycle states shared by every kind of ticked entity (person
//! agents, signals, communication-layer entities).

/// Where an entity sits in its lifecycle relative to the current tick.
///
/// A `WorkGroup` only calls `frame_tick` on `Active` entities. `Pending`
/// entities are promoted to `Active` (calling `frame_init` once) during the
/// manage-entities phase once their start tick has arrived; `Removed`
/// entities are dropped from their worker's partition in the same phase.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LifecycleState {
    /// Constructed but not yet due to start (e.g. a trip chain that begins
    /// later in the run).
    Pending,
    /// Ticked every frame via `frame_tick`.
    Active,
    /// Finished; will be removed from its worker's partition at the next
    /// manage-entities phase.
    Removed,
}

/// The result of ticking one entity for one frame.
///
/// Returned by `frame_init` and `frame_tick` so the owning `WorkGroup` knows
/// what to do with the entity before the next frame: keep ticking it, retire
/// it, or retire it while also ending the surrounding work group's frame
/// early (used by fatal-but-local conditions that should not corrupt a
/// shared structure if other entities kept running).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum UpdateStatus {
    /// Keep ticking this entity next frame.
    Continue,
    /// The entity is done; move it to `LifecycleState::Removed`.
    Done,
    /// The entity is done, and the rest of its work group's entities should
    /// also stop being ticked for the remainder of this frame. Rare — used
    /// when an entity detects a condition that makes further ticking in the
    /// same frame meaningless (e.g. output sink closed).
    RemoveAndContinueGroup,
}
