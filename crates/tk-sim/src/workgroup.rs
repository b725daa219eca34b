//! `WorkGroup` — one independently partitioned, independently threaded
//! population of [`Entity`] implementors (spec.md §4.E; the three groups
//! named by `tk_core::time::WorkerCounts` are `person`, `signal`, and
//! `communication`, each its own `WorkGroup`).
//!
//! Each partition is a genuinely separate `Vec<E>`, not a slice of one
//! shared `Vec` — every entity owns its own mutable state, so
//! `std::thread::scope` can hand each worker thread `&mut Vec<E>` with zero
//! `unsafe`. Single- and multi-threaded runs call the exact same
//! [`crate::worker::Worker::run_update`] body, so their output is
//! byte-identical regardless of worker count (spec.md §8 P7).

use tk_core::lifecycle::UpdateStatus;
use tk_core::{AgentId, Tick};
use tk_roles::SimContext;

use crate::entity::Entity;
use crate::worker::Worker;

/// How a freshly-inserted entity is assigned to a partition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PartitionStrategy {
    /// Assign partitions in rotation, regardless of load. Simple, stable,
    /// and the default — matches the teacher's round-robin Rayon chunking.
    #[default]
    RoundRobin,
    /// Assign to whichever partition currently holds the fewest entities.
    LeastLoaded,
    /// Assign by a stable hash of the entity's `AgentId` modulo worker
    /// count — a stand-in for "by home zone" partitioning that keeps an
    /// entity on the same worker across its whole lifetime.
    ByPartitionId,
}

/// One independently threaded population of entities.
pub struct WorkGroup<E: Entity> {
    partitions: Vec<Vec<E>>,
    strategy: PartitionStrategy,
    next_round_robin: usize,
    soft_budget_ms: Option<u64>,
}

impl<E: Entity> WorkGroup<E> {
    pub fn new(worker_count: usize, strategy: PartitionStrategy) -> Self {
        let worker_count = worker_count.max(1);
        Self {
            partitions: (0..worker_count).map(|_| Vec::new()).collect(),
            strategy,
            next_round_robin: 0,
            soft_budget_ms: None,
        }
    }

    pub fn with_soft_budget_ms(mut self, budget_ms: u64) -> Self {
        self.soft_budget_ms = Some(budget_ms);
        self
    }

    pub fn worker_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn len(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Assign `entity` to a partition per this group's [`PartitionStrategy`].
    pub fn insert(&mut self, entity: E) {
        let idx = match self.strategy {
            PartitionStrategy::RoundRobin => {
                let idx = self.next_round_robin;
                self.next_round_robin = (self.next_round_robin + 1) % self.partitions.len();
                idx
            }
            PartitionStrategy::LeastLoaded => self
                .partitions
                .iter()
                .enumerate()
                .min_by_key(|(_, p)| p.len())
                .map(|(idx, _)| idx)
                .unwrap_or(0),
            PartitionStrategy::ByPartitionId => {
                (entity.id().0 as usize).wrapping_mul(2_654_435_761) % self.partitions.len()
            }
        };
        self.partitions[idx].push(entity);
    }

    /// Run one tick's update phase over every partition and return each
    /// entity's resulting status, in no particular cross-partition order.
    ///
    /// With one partition (debug / `WorkerCounts::SINGLE_THREADED`), runs on
    /// the calling thread directly. With more than one, spawns one
    /// `std::thread::scope` worker per partition — both paths call the
    /// identical [`Worker::run_update`] body.
    pub fn run_tick(&mut self, tick: Tick, ctx: &SimContext<'_>) -> Vec<(AgentId, UpdateStatus)> {
        if self.partitions.len() <= 1 {
            return self
                .partitions
                .first_mut()
                .map(|partition| Worker::run_update(partition, tick, ctx, self.soft_budget_ms))
                .unwrap_or_default();
        }

        let soft_budget_ms = self.soft_budget_ms;
        std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .partitions
                .iter_mut()
                .map(|partition| {
                    scope.spawn(move || Worker::run_update(partition, tick, ctx, soft_budget_ms))
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| h.join().expect("work group thread panicked"))
                .collect()
        })
    }

    /// Apply `f` to every entity across every partition, in partition order.
    /// Used by the kernel for the pre-update-phase message delivery pass,
    /// which must run sequentially before workers start reading state.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut E)) {
        for partition in &mut self.partitions {
            for entity in partition.iter_mut() {
                f(entity);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.partitions.iter().flat_map(|p| p.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut E> {
        self.partitions.iter_mut().flat_map(|p| p.iter_mut())
    }

    /// Remove every entity for which `f` returns `true`, across all
    /// partitions — used by the manage-entities phase to drop entities that
    /// finished (`UpdateStatus::Done`) or were force-removed.
    pub fn retain(&mut self, mut f: impl FnMut(&E) -> bool) {
        for partition in &mut self.partitions {
            partition.retain(&mut f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tk_agent::AgentStoreBuilder;
    use tk_core::Tick;
    use tk_mobility::MobilityStore;
    use tk_schedule::TripChain;
    use tk_spatial::{AuraBackend, RoadNetworkBuilder};

    struct Counter {
        id: AgentId,
        ticks: u32,
    }

    impl Entity for Counter {
        fn id(&self) -> AgentId {
            self.id
        }
        fn start_tick(&self) -> Tick {
            Tick::ZERO
        }
        fn frame_init(&mut self, _tick: Tick) {}
        fn frame_tick(&mut self, _tick: Tick, _ctx: &SimContext<'_>) -> UpdateStatus {
            self.ticks += 1;
            if self.ticks >= 3 {
                UpdateStatus::Done
            } else {
                UpdateStatus::Continue
            }
        }
    }

    fn ctx_fixture() -> (tk_agent::AgentStore, tk_spatial::RoadNetwork, MobilityStore, Box<dyn tk_spatial::AuraManager>, Vec<TripChain>) {
        let store = AgentStoreBuilder::new(4).build();
        let network = RoadNetworkBuilder::new().build();
        let mobility = MobilityStore::new(4);
        let aura = AuraBackend::Grid.build();
        (store, network, mobility, aura, Vec::new())
    }

    #[test]
    fn round_robin_distributes_across_partitions() {
        let mut group: WorkGroup<Counter> = WorkGroup::new(2, PartitionStrategy::RoundRobin);
        for i in 0..4 {
            group.insert(Counter { id: AgentId(i), ticks: 0 });
        }
        assert_eq!(group.worker_count(), 2);
        assert_eq!(group.len(), 4);
    }

    #[test]
    fn single_and_multi_threaded_runs_agree() {
        let (store, network, mobility, aura, trip_chains) = ctx_fixture();
        let ctx = SimContext::new(Tick::ZERO, 1, &store, &network, &mobility, aura.as_ref(), &trip_chains);

        let mut single: WorkGroup<Counter> = WorkGroup::new(1, PartitionStrategy::RoundRobin);
        let mut multi: WorkGroup<Counter> = WorkGroup::new(3, PartitionStrategy::RoundRobin);
        for i in 0..6 {
            single.insert(Counter { id: AgentId(i), ticks: 0 });
            multi.insert(Counter { id: AgentId(i), ticks: 0 });
        }

        let mut single_results = single.run_tick(Tick::ZERO, &ctx);
        let mut multi_results = multi.run_tick(Tick::ZERO, &ctx);
        single_results.sort_by_key(|(id, _)| id.0);
        multi_results.sort_by_key(|(id, _)| id.0);
        assert_eq!(single_results, multi_results);
    }
}
