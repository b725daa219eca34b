//! Core agent storage: `AgentStore`, double-buffered SoA data shared across
//! every agent.
//!
//! Per-agent RNG state is not here — it lives on `tk_sim::AgentEntity` as a
//! private field, since each `AgentEntity` is already its own disjoint unit
//! of mutation and there is no borrow-split problem to solve by pulling RNGs
//! out into a separate array.
//!
//! # Double buffering
//!
//! Position, lane, and queuing state are the fields every reader (aura
//! queries, other agents' perception, output) needs stable for the whole
//! tick while the owning agent is free to compute its next value. Each such
//! field is stored as a `current` / `pending` array pair rather than a
//! `Vec<BufferedCell<T>>`: per-tick writes are sequential index assignments
//! (`pending[i] = v`), and [`AgentStore::flip`] promotes every field in one
//! pass with `mem::swap`, avoiding one clone per element per tick.
//! `tk_core::BufferedCell` remains the right tool for single-value cells
//! (e.g. a signal's traffic colors); here the array-of-values case is common
//! enough to warrant its own structure.

use std::mem;

use tk_core::{AgentId, LaneRef, LifecycleState, Point2d};

use crate::component::ComponentMap;

// ── AgentStore ────────────────────────────────────────────────────────────────

/// Structure-of-Arrays storage for every agent's published and pending
/// state.
///
/// Every `Vec` field has exactly `count` elements; the `AgentId` value is the
/// index into all of them:
///
/// ```ignore
/// let pos = store.position(agent);  // O(1), cache-friendly
/// ```
///
/// Application-defined state (trip chain, role, perception cache, …) lives
/// in [`ComponentMap`] and is accessed via [`AgentStore::component`] /
/// [`AgentStore::component_mut`].
pub struct AgentStore {
    /// Number of agent slots. Equals the length of every SoA `Vec`. Slots
    /// whose `lifecycle` is `Removed` are never reused within a run — a
    /// removed agent's index is simply never ticked again.
    pub count: usize,

    // ── Lifecycle ──────────────────────────────────────────────────────────
    pub lifecycle: Vec<LifecycleState>,
    /// Tick at which a `Pending` agent becomes `Active`. Ignored once active.
    pub start_tick: Vec<tk_core::Tick>,

    // ── Double-buffered spatial state ──────────────────────────────────────
    position_current: Vec<Point2d>,
    position_pending: Vec<Point2d>,

    lane_current: Vec<LaneRef>,
    lane_pending: Vec<LaneRef>,

    /// Progress along the current lane's segment, in centimetres from the
    /// segment's start node.
    dist_on_segment_current: Vec<i64>,
    dist_on_segment_pending: Vec<i64>,

    /// `true` while the agent is stopped in queue (behind a red light or
    /// stopped lead vehicle) — read by downstream perception and by output.
    queuing_current: Vec<bool>,
    queuing_pending: Vec<bool>,

    /// Segment the agent intends to move onto next, set during the update
    /// phase and consumed by the lane-changing / gap-acceptance logic before
    /// the flip. `SegmentId::INVALID` when no request is pending.
    pub next_segment_requested: Vec<tk_core::SegmentId>,

    // ── Application components ────────────────────────────────────────────
    components: ComponentMap,
}

impl AgentStore {
    /// `true` if there are no agents.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterator over all `AgentId`s in ascending index order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.count as u32).map(AgentId)
    }

    /// Iterator over `AgentId`s whose lifecycle is `Active`.
    pub fn active_agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agent_ids()
            .filter(|id| self.lifecycle[id.index()] == LifecycleState::Active)
    }

    // ── Spatial accessors (read last tick's published value) ──────────────

    #[inline]
    pub fn position(&self, agent: AgentId) -> Point2d {
        self.position_current[agent.index()]
    }

    #[inline]
    pub fn lane(&self, agent: AgentId) -> LaneRef {
        self.lane_current[agent.index()]
    }

    #[inline]
    pub fn dist_on_segment(&self, agent: AgentId) -> i64 {
        self.dist_on_segment_current[agent.index()]
    }

    #[inline]
    pub fn is_queuing(&self, agent: AgentId) -> bool {
        self.queuing_current[agent.index()]
    }

    // ── Spatial mutators (write the pending value only) ────────────────────

    #[inline]
    pub fn set_position(&mut self, agent: AgentId, value: Point2d) {
        self.position_pending[agent.index()] = value;
    }

    #[inline]
    pub fn set_lane(&mut self, agent: AgentId, value: LaneRef) {
        self.lane_pending[agent.index()] = value;
    }

    #[inline]
    pub fn set_dist_on_segment(&mut self, agent: AgentId, value: i64) {
        self.dist_on_segment_pending[agent.index()] = value;
    }

    #[inline]
    pub fn set_queuing(&mut self, agent: AgentId, value: bool) {
        self.queuing_pending[agent.index()] = value;
    }

    /// Promote every `pending` array to `current` in one pass, by swapping
    /// the buffers rather than cloning. Must only be called during the
    /// kernel's flip phase, after every worker has finished its update phase
    /// for the tick and before the aura rebuild (which reads `current`
    /// positions only).
    ///
    /// Swapping (instead of copying) means an active agent's movement facet
    /// must write all of position/lane/dist-on-segment/queuing on every
    /// frame it ticks — these are not "carried forward" implicitly. A role
    /// that leaves an agent stationary for a frame still republishes its
    /// unchanged position so the swap sees a fresh value in `pending`.
    pub fn flip(&mut self) {
        mem::swap(&mut self.position_current, &mut self.position_pending);
        mem::swap(&mut self.lane_current, &mut self.lane_pending);
        mem::swap(
            &mut self.dist_on_segment_current,
            &mut self.dist_on_segment_pending,
        );
        mem::swap(&mut self.queuing_current, &mut self.queuing_pending);
    }

    // ── Component access ──────────────────────────────────────────────────

    /// Read-only slice of application component `T`.
    ///
    /// Returns `None` if `T` was not registered before the store was built.
    /// Index by `agent.index()` to access a specific agent's value.
    pub fn component<T: Default + Send + Sync + 'static>(&self) -> Option<&[T]> {
        self.components.get::<T>()
    }

    /// Mutable reference to the component `Vec<T>`.
    ///
    /// Returns `None` if `T` was not registered. Only call this during the
    /// update phase from the worker that owns the agent being written.
    pub fn component_mut<T: Default + Send + Sync + 'static>(&mut self) -> Option<&mut Vec<T>> {
        self.components.get_mut::<T>()
    }

    /// Reference to the whole `ComponentMap` (e.g. for passing to output writers).
    pub fn components(&self) -> &ComponentMap {
        &self.components
    }

    /// Mutable reference to the `ComponentMap` (e.g. for the manage-entities phase).
    pub fn components_mut(&mut self) -> &mut ComponentMap {
        &mut self.components
    }

    // ── Package-private constructor used by AgentStoreBuilder ─────────────

    pub(crate) fn new(count: usize, components: ComponentMap) -> Self {
        Self {
            count,
            lifecycle: vec![LifecycleState::Pending; count],
            start_tick: vec![tk_core::Tick::ZERO; count],
            position_current: vec![Point2d::ORIGIN; count],
            position_pending: vec![Point2d::ORIGIN; count],
            lane_current: vec![LaneRef::default(); count],
            lane_pending: vec![LaneRef::default(); count],
            dist_on_segment_current: vec![0; count],
            dist_on_segment_pending: vec![0; count],
            queuing_current: vec![false; count],
            queuing_pending: vec![false; count],
            next_segment_requested: vec![tk_core::SegmentId::INVALID; count],
            components,
        }
    }
}
