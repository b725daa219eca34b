//! `SharedDataManager`/`FlipGroup` — the kernel's single point of contact
//! for "promote every published double-buffer at once" (spec.md §4.F's
//! flip phase), generalizing `tk_core::buffered::SyncBufferedCell::flip`'s
//! single-cell shape to the whole roster of shared, cross-work-group state.

use std::sync::{Arc, Mutex};

use tk_agent::AgentStore;

/// Something with a current/pending pair that can be promoted in one shot.
///
/// `&self`, not `&mut self`: members are held behind `Arc<dyn FlipGroup>` so
/// the kernel can flip every registered group without any one of them
/// requiring exclusive ownership. Types whose own flip needs `&mut self`
/// (like [`AgentStore`]) are wrapped in a `Mutex` — legal without violating
/// the orphan rule, since `FlipGroup` is a local trait even though `Mutex`
/// and `AgentStore` are both foreign.
pub trait FlipGroup: Send + Sync {
    fn flip_all(&self);
}

impl FlipGroup for Mutex<AgentStore> {
    fn flip_all(&self) {
        self.lock().expect("AgentStore mutex poisoned").flip();
    }
}

impl FlipGroup for tk_signal::Signal {
    fn flip_all(&self) {
        self.flip();
    }
}

/// Registry of every shared double-buffered structure the kernel must flip
/// once per tick, after the update phase's barrier and before the
/// aura-rebuild phase.
///
/// `tk_message::MessageBus::deliver_phase` is deliberately NOT registered
/// here: it needs a liveness-predicate closure (`Fn(AgentId) -> bool`) that
/// a generic, argument-less `flip_all()` can't supply, so the kernel calls
/// it directly instead.
#[derive(Default, Clone)]
pub struct SharedDataManager {
    groups: Vec<Arc<dyn FlipGroup>>,
}

impl SharedDataManager {
    pub fn new() -> Self {
        Self { groups: Vec::new() }
    }

    pub fn register(&mut self, group: Arc<dyn FlipGroup>) {
        self.groups.push(group);
    }

    /// Flip every registered group, in registration order.
    pub fn flip_all(&self) {
        for group in &self.groups {
            group.flip_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(std::sync::atomic::AtomicU32);

    impl FlipGroup for Counter {
        fn flip_all(&self) {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }

    #[test]
    fn flip_all_visits_every_registered_group_once() {
        let mut mgr = SharedDataManager::new();
        let a = Arc::new(Counter(std::sync::atomic::AtomicU32::new(0)));
        let b = Arc::new(Counter(std::sync::atomic::AtomicU32::new(0)));
        mgr.register(a.clone());
        mgr.register(b.clone());

        mgr.flip_all();
        mgr.flip_all();

        assert_eq!(a.0.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(b.0.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
