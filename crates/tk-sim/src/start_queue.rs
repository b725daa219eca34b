//! `StartQueue` — activates `Pending` entities at their `start_tick`
//! (spec.md §4.G's manage-entities phase).

use std::collections::BTreeSet;

use tk_core::{AgentId, Tick};

/// Ordered by `(start_tick, AgentId)` so `pop_eligible` can split off every
/// entry due at or before `now` in one `BTreeSet` operation.
#[derive(Debug, Default)]
pub struct StartQueue {
    entries: BTreeSet<(Tick, AgentId)>,
}

impl StartQueue {
    pub fn new() -> Self {
        Self { entries: BTreeSet::new() }
    }

    pub fn push(&mut self, start_tick: Tick, agent: AgentId) {
        self.entries.insert((start_tick, agent));
    }

    pub fn peek(&self) -> Option<(Tick, AgentId)> {
        self.entries.iter().next().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Remove and return every agent whose `start_tick <= now`, in
    /// ascending `(start_tick, AgentId)` order.
    ///
    /// `AgentId(0)` — the minimum real id, not `AgentId::INVALID` (which is
    /// the *maximum* sentinel, `u32::MAX`) — is used as the split boundary's
    /// second element, so `split_off` at `(now.offset(1), AgentId(0))`
    /// correctly separates "due now or earlier" from "due strictly later"
    /// regardless of which ids happen to exist at `now + 1`.
    pub fn pop_eligible(&mut self, now: Tick) -> Vec<AgentId> {
        let boundary = (now.offset(1), AgentId(0));
        let future = self.entries.split_off(&boundary);
        let due = std::mem::replace(&mut self.entries, future);
        due.into_iter().map(|(_, agent)| agent).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_eligible_returns_only_due_entries_in_order() {
        let mut q = StartQueue::new();
        q.push(Tick(5), AgentId(3));
        q.push(Tick(5), AgentId(1));
        q.push(Tick(10), AgentId(2));

        let due = q.pop_eligible(Tick(5));
        assert_eq!(due, vec![AgentId(1), AgentId(3)]);
        assert_eq!(q.len(), 1);

        assert!(q.pop_eligible(Tick(9)).is_empty());

        let due = q.pop_eligible(Tick(10));
        assert_eq!(due, vec![AgentId(2)]);
        assert!(q.is_empty());
    }

    #[test]
    fn peek_does_not_remove() {
        let mut q = StartQueue::new();
        q.push(Tick(7), AgentId(4));
        assert_eq!(q.peek(), Some((Tick(7), AgentId(4))));
        assert_eq!(q.len(), 1);
    }
}
