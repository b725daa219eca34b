//! `Envelope` — one posted message, tagged with enough identity to give
//! delivery a stable, deterministic order (spec.md §4.K).

use tk_core::AgentId;

/// A message in flight between two handlers.
///
/// `seq` is assigned per-sender by [`crate::MessageBus::post`] — delivery
/// order among messages sharing a target and originating tick is stable by
/// `(from, seq)`, independent of which worker thread happened to call
/// `post` first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub from: AgentId,
    pub seq: u64,
    pub payload: Vec<u8>,
}
