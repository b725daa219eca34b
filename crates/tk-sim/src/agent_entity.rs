//! Concrete [`Entity`] adapters: [`AgentEntity`] for person agents and
//! [`SignalEntity`] for traffic signals, so both can be driven by the same
//! barrier-synchronized [`crate::workgroup::WorkGroup`] machinery, just on
//! separate `WorkerCounts` populations (`person` vs `signal`).

use tk_core::lifecycle::UpdateStatus;
use tk_core::{AgentId, AgentRng, Tick};
use tk_roles::{AgentRoleState, Dispatcher, Intent, Role, SimContext};
use tk_schedule::TripChain;
use tk_signal::Signal;

use crate::entity::Entity;

// ── AgentEntity ─────────────────────────────────────────────────────────────

/// The sole `Entity` adapter for person agents: owns its trip chain, its
/// role-dispatcher state, and a private per-agent RNG (replacing the old
/// `Sim<B,R>`'s separately-split `AgentRngs` — each `AgentEntity` is already
/// its own disjoint unit of mutation, so there is no longer a borrow-split
/// problem to solve by keeping RNGs in their own array).
pub struct AgentEntity {
    id: AgentId,
    start_tick: Tick,
    chain: TripChain,
    role_state: AgentRoleState,
    rng: AgentRng,
    /// Intents emitted by the last `frame_tick`/`receive`, drained by the
    /// kernel's sequential apply step once the update-phase barrier clears.
    pending_intents: Vec<Intent>,
}

impl AgentEntity {
    pub fn new(id: AgentId, start_tick: Tick, chain: TripChain, seed: u64) -> Self {
        let role_state = AgentRoleState::start(&chain);
        Self {
            id,
            start_tick,
            chain,
            role_state,
            rng: AgentRng::new(seed, id),
            pending_intents: Vec::new(),
        }
    }

    pub fn role(&self) -> &Role {
        &self.role_state.role
    }

    pub fn prev_role(&self) -> Option<&Role> {
        self.role_state.prev_role.as_ref()
    }

    /// Deliver one message addressed to this agent. Called by the kernel,
    /// sequentially, before the update phase's barrier — see
    /// `Kernel::deliver_messages`.
    pub fn receive(&mut self, from: AgentId, payload: &[u8]) {
        let intents = self.role_state.role.on_message(from, payload);
        self.pending_intents.extend(intents);
    }

    /// Drain this tick's emitted intents for the sequential apply phase.
    pub fn take_intents(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.pending_intents)
    }
}

impl Entity for AgentEntity {
    fn id(&self) -> AgentId {
        self.id
    }

    fn start_tick(&self) -> Tick {
        self.start_tick
    }

    fn frame_init(&mut self, _tick: Tick) {
        // `role_state` was already seeded with the chain's first Activity by
        // `AgentRoleState::start` at construction time.
    }

    fn frame_tick(&mut self, _tick: Tick, ctx: &SimContext<'_>) -> UpdateStatus {
        self.role_state.role.perceive(self.id, ctx);
        Dispatcher::advance(&mut self.role_state, &self.chain, self.id, ctx);
        let intents = self.role_state.role.decide(self.id, ctx, &mut self.rng);
        self.pending_intents.extend(intents);
        self.role_state.role.move_(self.id, ctx);

        if matches!(self.role_state.role, Role::Finished) {
            UpdateStatus::Done
        } else {
            UpdateStatus::Continue
        }
    }
}

// ── SignalEntity ──────────────────────────────────────────────────────────

/// `Entity` adapter for a traffic signal, so the signal population gets its
/// own `WorkGroup` (`WorkerCounts::signal`) driven by the identical
/// update/flip/manage-entities machinery as the person population, per
/// spec.md §4.C/D's "signals also implement `Entity`".
pub struct SignalEntity {
    id: AgentId,
    tick_duration_ms: u32,
    pub signal: Signal,
}

impl SignalEntity {
    /// `id` is a synthetic `AgentId` used only for `StartQueue`/logging
    /// identity — signals are keyed by `SignalId` everywhere else; the two
    /// id spaces do not overlap in the kernel's bookkeeping.
    pub fn new(id: AgentId, tick_duration_ms: u32, signal: Signal) -> Self {
        Self { id, tick_duration_ms, signal }
    }
}

impl Entity for SignalEntity {
    fn id(&self) -> AgentId {
        self.id
    }

    fn start_tick(&self) -> Tick {
        Tick::ZERO
    }

    fn is_non_spatial(&self) -> bool {
        true
    }

    fn frame_init(&mut self, _tick: Tick) {}

    fn frame_tick(&mut self, _tick: Tick, _ctx: &SimContext<'_>) -> UpdateStatus {
        self.signal.tick_update(self.tick_duration_ms);
        UpdateStatus::Continue
    }
}
