//! `Worker` — the stateless per-partition update-phase body (spec.md §4.E),
//! shared verbatim between the single-threaded debug path and every
//! `std::thread::scope`-spawned worker thread so results are byte-identical
//! regardless of worker count (spec.md §8 P7).

use std::time::{Duration, Instant};

use tk_core::{AgentId, Tick};
use tk_core::lifecycle::UpdateStatus;
use tk_roles::SimContext;

use crate::entity::Entity;

pub struct Worker;

impl Worker {
    /// Run one tick's update phase over a single partition.
    ///
    /// Calls `frame_init` once for any entity encountering its first
    /// `Active` frame is the caller's responsibility (the kernel promotes
    /// `Pending` -> `Active` during manage-entities, before `run_update` is
    /// invoked) — this only drives the steady-state `frame_tick`/
    /// `frame_output` pair.
    ///
    /// `soft_budget_ms`, if set, logs a `tracing::warn!` when the partition
    /// overruns it — informational only, never aborts the tick.
    pub fn run_update<E: Entity>(
        partition: &mut [E],
        tick: Tick,
        ctx: &SimContext<'_>,
        soft_budget_ms: Option<u64>,
    ) -> Vec<(AgentId, UpdateStatus)> {
        let started = Instant::now();
        let mut results = Vec::with_capacity(partition.len());

        for entity in partition.iter_mut() {
            let status = entity.frame_tick(tick, ctx);
            entity.frame_output(tick);
            let stop_group = status == UpdateStatus::RemoveAndContinueGroup;
            results.push((entity.id(), status));
            if stop_group {
                tracing::debug!(
                    tick = tick.0,
                    ticked = results.len(),
                    partition_len = partition.len(),
                    "entity requested early end of work group's frame"
                );
                break;
            }
        }

        if let Some(budget_ms) = soft_budget_ms {
            let elapsed = started.elapsed();
            if elapsed > Duration::from_millis(budget_ms) {
                tracing::warn!(
                    tick = tick.0,
                    partition_len = partition.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms,
                    "worker partition exceeded soft time budget"
                );
            } else {
                tracing::debug!(
                    tick = tick.0,
                    partition_len = partition.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "worker partition update complete"
                );
            }
        }

        results
    }
}
