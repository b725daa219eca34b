//! `Role` — the tagged variant that replaces the old class-per-mode model.
//!
//! spec.md §9 is explicit that a role is "a tagged variant with a uniform
//! {perceive, decide, move} capability set, not an inheritance hierarchy."
//! Every agent holds exactly one `Role` at a time; `Dispatcher::advance`
//! (see `dispatcher.rs`) swaps it out as the agent's trip chain progresses.
//!
//! Concrete car-following, lane-changing, and route-choice models are out of
//! scope (spec.md §1 Non-goals) — `decide`/`move` here only produce the
//! coarse-grained intents tk-sim's mobility engine needs to teleport an agent
//! between nodes, and publish the interpolated position tk-output reads.

use tk_core::{AgentId, AgentRng, NodeId, Tick, TransportMode};

use crate::{Intent, SimContext};

/// State shared by every role that is travelling a `SubTrip` (Driver,
/// Pedestrian, BusDriver, Passenger all travel the same way — only the
/// `TransportMode` and the kernel's interpretation of "in this role" differ).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelState {
    /// Index of the sub-trip within its parent `Trip`.
    pub sub_trip_seq: u32,
    pub destination: NodeId,
    pub mode: TransportMode,
    /// Transit line, when `mode == Transit`.
    pub line: Option<u32>,
    /// Set once `Intent::TravelTo` has been issued, so `decide` only emits it once.
    pub departed: bool,
}

/// State for an agent waiting at a stop for a transit vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitBusState {
    pub line: Option<u32>,
    pub destination: NodeId,
    /// Set by `on_message` once a `Boarded` message arrives from the vehicle.
    pub boarded: bool,
}

/// State for an agent performing a stationary `Activity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityState {
    pub until_tick: Tick,
}

/// The role an agent is currently playing.
///
/// This is a flat tagged union, not a trait hierarchy: `perceive`/`decide`/
/// `move_`/`is_done` are inherent methods that match on `self`, so adding a
/// role only ever touches this one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Driver(TravelState),
    Pedestrian(TravelState),
    BusDriver(TravelState),
    Passenger(TravelState),
    WaitBusActivity(WaitBusState),
    ActivityPerformer(ActivityState),
    /// The trip chain is exhausted; the agent stays put indefinitely.
    Finished,
}

impl Role {
    /// Short, stable name for output rows (spec.md §6's per-tick agent
    /// records carry a `role` field) — not `Debug`, since `Debug` also
    /// prints the variant's payload.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Role::Driver(_) => "driver",
            Role::Pedestrian(_) => "pedestrian",
            Role::BusDriver(_) => "bus_driver",
            Role::Passenger(_) => "passenger",
            Role::WaitBusActivity(_) => "wait_bus_activity",
            Role::ActivityPerformer(_) => "activity_performer",
            Role::Finished => "finished",
        }
    }

    /// Read perception inputs (co-located agents, signal state, …).
    ///
    /// No role currently reacts to perception directly — contacts and
    /// messages are delivered through `on_contacts`/`on_message` instead —
    /// but the hook exists so a role can be extended without reshaping the
    /// dispatcher's call sequence.
    pub fn perceive(&mut self, _agent: AgentId, _ctx: &SimContext<'_>) {}

    /// Produce the intents this role wants to act on this tick.
    pub fn decide(&mut self, _agent: AgentId, _ctx: &SimContext<'_>, _rng: &mut AgentRng) -> Vec<Intent> {
        match self {
            Role::Driver(t) | Role::Pedestrian(t) | Role::BusDriver(t) | Role::Passenger(t) => {
                if t.departed {
                    vec![]
                } else {
                    t.departed = true;
                    vec![Intent::TravelTo { destination: t.destination, mode: t.mode }]
                }
            }
            // Waiting and performing an activity produce no intents; their
            // state just waits for `is_done` to flip.
            Role::WaitBusActivity(_) | Role::ActivityPerformer(_) | Role::Finished => vec![],
        }
    }

    /// Publish this tick's movement. Position/lane interpolation itself is
    /// computed by the mobility engine; this hook is where a future
    /// car-following or pedestrian-flow model would assign lane/offset —
    /// deliberately left a no-op here (Non-goal).
    pub fn move_(&mut self, _agent: AgentId, _ctx: &SimContext<'_>) {}

    /// Handle a message addressed to this agent (spec.md §4.K).
    ///
    /// Only `WaitBusActivity` currently reacts — a `Boarded` message (a
    /// single `0x01` byte, sent by the vehicle's `BusDriver` role on pickup)
    /// flips `boarded`, which `is_done` reads.
    pub fn on_message(&mut self, _from: AgentId, payload: &[u8]) -> Vec<Intent> {
        if let Role::WaitBusActivity(w) = self {
            if payload.first() == Some(&1) {
                w.boarded = true;
            }
        }
        vec![]
    }

    /// Has this role finished its work, so the dispatcher should advance the
    /// trip chain to the next item?
    pub fn is_done(&self, agent: AgentId, ctx: &SimContext<'_>) -> bool {
        match self {
            Role::Driver(t) | Role::Pedestrian(t) | Role::BusDriver(t) | Role::Passenger(t) => {
                t.departed && !ctx.mobility.in_transit(agent)
            }
            Role::WaitBusActivity(w) => w.boarded,
            Role::ActivityPerformer(a) => ctx.tick >= a.until_tick,
            Role::Finished => false,
        }
    }
}
