//! Agent intents — the actions an agent can request during replanning.

use tk_core::{AgentId, NodeId, Tick, TransportMode};

/// An action that an agent wants to perform during the current tick.
///
/// Intents are produced by a [`Role`][crate::Role]'s `decide` step and
/// consumed by the kernel's apply phase (tk-sim) and mobility engine
/// (tk-mobility).
///
/// Multiple intents may be returned per agent per tick; the caller is
/// responsible for resolving any conflicts (e.g. two `TravelTo` requests).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Agent wants to travel to `destination` via `mode`.
    ///
    /// tk-mobility will compute a route and record an `arrival_tick`.
    TravelTo {
        destination: NodeId,
        mode:        TransportMode,
    },

    /// Agent wants to be woken again at `tick` for re-planning.
    WakeAt(Tick),

    /// Agent wants to deliver a message to `to`.
    ///
    /// Delivered on the recipient's next tick via the message bus.
    SendMessage {
        to:      AgentId,
        payload: Vec<u8>,
    },
}
