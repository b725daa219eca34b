//! `MessageBus` — deferred, per-tick inter-entity message delivery
//! (spec.md §4.K).
//!
//! `post` is non-blocking and safe to call from any worker during the
//! update phase; it only ever appends to a per-target `Mutex`-guarded
//! staging list. Delivery itself is deferred to the *next* tick: the
//! kernel calls [`MessageBus::deliver_phase`] once per tick (after flip,
//! before the next tick's update phase) to promote staged messages into
//! each target's readable inbox, preserving the same double-buffering
//! invariant as every other cross-tick publication in the kernel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tk_core::AgentId;

use crate::envelope::Envelope;
use crate::error::{MessageError, MessageResult};

#[derive(Default)]
struct Staging {
    by_target: HashMap<AgentId, Vec<Envelope>>,
    next_seq: HashMap<AgentId, u64>,
}

/// The deferred message bus shared by every worker.
pub struct MessageBus {
    staging: Mutex<Staging>,
    inbox: HashMap<AgentId, Vec<Envelope>>,
    dropped_count: AtomicU64,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBus {
    pub fn new() -> Self {
        Self {
            staging: Mutex::new(Staging::default()),
            inbox: HashMap::new(),
            dropped_count: AtomicU64::new(0),
        }
    }

    /// Stage a message from `from` to `to`, to be delivered at the start of
    /// the next tick. Safe to call concurrently from any worker.
    pub fn post(&self, from: AgentId, to: AgentId, payload: Vec<u8>) -> MessageResult<()> {
        if to == AgentId::INVALID {
            return Err(MessageError::InvalidTarget);
        }
        let mut staging = self.staging.lock().unwrap();
        let seq = {
            let counter = staging.next_seq.entry(from).or_insert(0);
            let seq = *counter;
            *counter += 1;
            seq
        };
        staging.by_target.entry(to).or_default().push(Envelope { from, seq, payload });
        Ok(())
    }

    /// Promote this tick's staged messages into each target's inbox,
    /// dropping (and counting) messages whose target no longer exists per
    /// `is_active`. Delivery order within a target is `(from, seq)`.
    ///
    /// Must run once per tick, after the flip phase and before the next
    /// tick's update phase begins.
    pub fn deliver_phase(&mut self, is_active: impl Fn(AgentId) -> bool) {
        let mut staging = self.staging.lock().unwrap();
        let by_target = std::mem::take(&mut staging.by_target);
        drop(staging);

        self.inbox.clear();
        for (target, mut envelopes) in by_target {
            if !is_active(target) {
                self.dropped_count.fetch_add(envelopes.len() as u64, Ordering::Relaxed);
                continue;
            }
            envelopes.sort_by(|a, b| (a.from, a.seq).cmp(&(b.from, b.seq)));
            self.inbox.insert(target, envelopes);
        }
    }

    /// This tick's deliverable messages for `target` (empty if none).
    pub fn inbox(&self, target: AgentId) -> &[Envelope] {
        self.inbox.get(&target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Take (and clear) `target`'s inbox for this tick.
    pub fn take_inbox(&mut self, target: AgentId) -> Vec<Envelope> {
        self.inbox.remove(&target).unwrap_or_default()
    }

    /// Total messages silently dropped so far because their target had
    /// already been removed by the time `deliver_phase` ran.
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }
}
