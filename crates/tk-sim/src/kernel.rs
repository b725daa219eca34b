//! `Kernel` — the per-tick driver tying every work group, the shared-state
//! flip, and the entity lifecycle together (spec.md §4's four phases:
//! update -> flip -> aura rebuild -> manage entities).

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tk_agent::AgentStore;
use tk_core::lifecycle::UpdateStatus;
use tk_core::{AgentId, GeoPoint, LaneRef, NodeId, Point2d, SimClock, SimConfig, Tick};
use tk_mobility::MobilityEngine;
use tk_roles::{Intent, SimContext};
use tk_schedule::{TripChain, TripChainItem};
use tk_signal::Signal;
use tk_spatial::{AuraEntry, AuraManager, RoadNetwork, Router};

use crate::agent_entity::{AgentEntity, SignalEntity};
use crate::config::GroupGranularity;
use crate::entity::Entity;
use crate::error::{SimError, SimResult};
use crate::shared::SharedDataManager;
use crate::start_queue::StartQueue;
use crate::workgroup::{PartitionStrategy, WorkGroup};
use tk_message::MessageBus;

/// Local equirectangular projection from `GeoPoint` lat/lon onto `Point2d`'s
/// centimetre plane, anchored at `origin`. Adequate at city scale; keeps
/// `Point2d`'s documented role as the deterministic arithmetic plane
/// (`tk_core::geo`) without pulling in a full geodesy crate for what is,
/// at this scale, a flat projection.
fn project(origin: GeoPoint, p: GeoPoint) -> Point2d {
    const M_PER_DEG_LAT: f64 = 111_320.0;
    let lat_rad = (origin.lat as f64).to_radians();
    let m_per_deg_lon = M_PER_DEG_LAT * lat_rad.cos();
    let x_m = (p.lon - origin.lon) as f64 * m_per_deg_lon;
    let y_m = (p.lat - origin.lat) as f64 * M_PER_DEG_LAT;
    Point2d::new((x_m * 100.0).round() as i64, (y_m * 100.0).round() as i64)
}

/// The barrier-synchronized kernel: one `WorkGroup` per population
/// (person, signal), a shared `AgentStore` mirror, the deferred message bus,
/// and the `StartQueue` that activates agents as their trip chains begin.
pub struct Kernel<R: Router> {
    config: SimConfig,
    granularity: GroupGranularity,
    clock: SimClock,
    shared: SharedDataManager,
    agent_store: Arc<Mutex<AgentStore>>,
    network: RoadNetwork,
    mobility: MobilityEngine<R>,
    aura: Box<dyn AuraManager>,
    trip_chains: Vec<TripChain>,
    start_queue: StartQueue,
    pending_agents: HashMap<AgentId, AgentEntity>,
    agents: WorkGroup<AgentEntity>,
    signals: WorkGroup<SignalEntity>,
    message_bus: MessageBus,
}

impl<R: Router> Kernel<R> {
    /// Build a kernel from already-constructed agents. Any entity whose
    /// `start_tick() <= Tick::ZERO` starts `Active`; the rest sit in the
    /// pending pool and are promoted by the `StartQueue` as their tick
    /// arrives.
    ///
    /// Initial placement resolves each agent's first `Activity` location:
    /// `LocationType::Node` places directly; `Home`/`Work` fall back to
    /// `NodeId(0)`, since resolving them to a concrete node needs an
    /// external person-to-address mapping this kernel does not load —
    /// documented simplification, not a silent bug.
    pub fn new(
        config: SimConfig,
        assignment_strategy: PartitionStrategy,
        granularity: GroupGranularity,
        agent_store: AgentStore,
        network: RoadNetwork,
        router: R,
        aura: Box<dyn AuraManager>,
        trip_chains: Vec<TripChain>,
        agent_entities: Vec<AgentEntity>,
    ) -> SimResult<Self> {
        config.validate().map_err(|e| SimError::Config(e.to_string()))?;

        let agent_count = agent_store.agent_ids().count();
        if trip_chains.len() != agent_count {
            return Err(SimError::AgentCountMismatch {
                expected: agent_count,
                got: trip_chains.len(),
                what: "trip_chains",
            });
        }

        let clock = config.make_clock();
        let mut mobility = MobilityEngine::new(router, agent_count);
        for (idx, chain) in trip_chains.iter().enumerate() {
            let start_node = match chain.item(0) {
                Some(TripChainItem::Activity(a)) => a.location.node_id().unwrap_or(NodeId(0)),
                _ => NodeId(0),
            };
            mobility.place(AgentId(idx as u32), start_node, Tick::ZERO);
        }

        let mut agents_group =
            WorkGroup::new(config.workers.person as usize, assignment_strategy);
        let signals_group =
            WorkGroup::new(config.workers.signal as usize, assignment_strategy);

        let mut start_queue = StartQueue::new();
        let mut pending_agents = HashMap::new();
        for entity in agent_entities {
            if entity.start_tick() <= Tick::ZERO {
                agents_group.insert(entity);
            } else {
                start_queue.push(entity.start_tick(), entity.id());
                pending_agents.insert(entity.id(), entity);
            }
        }

        let agent_store = Arc::new(Mutex::new(agent_store));
        let mut shared = SharedDataManager::new();
        shared.register(agent_store.clone());

        Ok(Self {
            config,
            granularity,
            clock,
            shared,
            agent_store,
            network,
            mobility,
            aura,
            trip_chains,
            start_queue,
            pending_agents,
            agents: agents_group,
            signals: signals_group,
            message_bus: MessageBus::new(),
        })
    }

    /// Register a signal, assigning it to the signal work group.
    pub fn add_signal(&mut self, synthetic_id: AgentId, tick_duration_ms: u32, signal: Signal) {
        self.signals
            .insert(SignalEntity::new(synthetic_id, tick_duration_ms, signal));
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    /// One row per active, spatial agent: `(id, position, lane, role name)`,
    /// read from the published `AgentStore` mirror (never `pending`) so
    /// output always reflects the last completed flip (spec.md §6's
    /// per-tick agent records). Intended to be called once per tick after
    /// `tick()` returns, by an output writer layered on top of `Kernel`.
    pub fn agent_snapshot(&self) -> Vec<(AgentId, Point2d, LaneRef, &'static str)> {
        let store = self.agent_store.lock().expect("AgentStore mutex poisoned");
        self.agents
            .iter()
            .map(|a| {
                let id = a.id();
                (id, store.position(id), store.lane(id), a.role().kind_name())
            })
            .collect()
    }

    /// Run every remaining tick up to `config.end_tick()`.
    pub fn run(&mut self) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.tick()?;
        }
        Ok(())
    }

    /// Advance the simulation by exactly one tick.
    pub fn tick(&mut self) -> SimResult<()> {
        let tick = self.clock.current_tick;
        let tick_duration_secs = (self.config.tick_duration_millis / 1000).max(1);

        // Phase 0: deliver last tick's staged messages sequentially, before
        // any worker reads or mutates agent state this tick.
        let bus = &self.message_bus;
        self.agents.for_each_mut(|agent| {
            for envelope in bus.inbox(agent.id()) {
                agent.receive(envelope.from, &envelope.payload);
            }
        });

        // Phase 1: update. Each work group ticks its own partitions
        // (parallel within a group via `WorkGroup::run_tick`); groups run
        // one after another since nothing in spec.md requires cross-group
        // concurrency, only cross-partition concurrency within one group.
        // Each work group only ticks on ticks where `now % granularity == 0`
        // (spec.md §4.E); a group not due this tick keeps whatever state its
        // last tick published.
        let agents_due = tick.0 % self.granularity.person as u64 == 0;
        let signals_due = tick.0 % self.granularity.signal as u64 == 0;
        let agent_results = {
            let store = self.agent_store.lock().expect("AgentStore mutex poisoned");
            let ctx = SimContext::new(
                tick,
                tick_duration_secs,
                &store,
                &self.network,
                &self.mobility.store,
                self.aura.as_ref(),
                &self.trip_chains,
            );
            let agent_results = if agents_due { self.agents.run_tick(tick, &ctx) } else { Vec::new() };
            if signals_due {
                self.signals.run_tick(tick, &ctx);
            }
            agent_results
        };
        // spec.md §7/§8 P2: no entity may be visited twice in one tick.
        // Structurally impossible in steady state — each `AgentEntity` lives
        // in exactly one partition `Vec`, so `WorkGroup::run_tick` can never
        // hand the same entity to two workers — but cheap enough to assert
        // in debug builds as a guard against a future partitioning bug.
        #[cfg(debug_assertions)]
        {
            let mut seen = HashSet::with_capacity(agent_results.len());
            for (id, _) in &agent_results {
                if !seen.insert(*id) {
                    crate::error::abort_fatal(SimError::fatal_invariant(
                        tick,
                        None,
                        Some(*id),
                        "entity visited twice in one tick",
                    ));
                }
            }
        }
        let agent_results: HashMap<AgentId, UpdateStatus> = agent_results.into_iter().collect();

        // Phase 2: apply intents sequentially, in ascending `AgentId` order,
        // so output is identical regardless of worker count (spec.md §8 P7).
        let mut applies: Vec<(AgentId, Vec<Intent>)> = Vec::new();
        self.agents.for_each_mut(|agent| {
            let intents = agent.take_intents();
            if !intents.is_empty() {
                applies.push((agent.id(), intents));
            }
        });
        applies.sort_by_key(|(id, _)| id.0);
        for (agent, intents) in applies {
            self.apply_intents(agent, intents, tick, tick_duration_secs);
        }
        self.mobility.tick_arrivals(tick);

        // Phase 3: flip. Republish every agent's position from the mobility
        // engine's current state, then promote every registered shared
        // double buffer (the `AgentStore` mirror) and every signal's
        // published colors in one pass.
        {
            let origin = self
                .network
                .node_pos
                .first()
                .copied()
                .unwrap_or(GeoPoint::new(0.0, 0.0));
            let mut store = self.agent_store.lock().expect("AgentStore mutex poisoned");
            let ids: Vec<AgentId> = store.agent_ids().collect();
            for agent_id in ids {
                let (from, to, frac) = self.mobility.visual_position(agent_id, tick);
                let pos = if to == NodeId::INVALID {
                    Point2d::ORIGIN
                } else {
                    let p_from = project(origin, self.network.node_pos[from.index()]);
                    let p_to = project(origin, self.network.node_pos[to.index()]);
                    p_from.lerp(p_to, frac as f64)
                };
                store.set_position(agent_id, pos);
            }
        }
        self.shared.flip_all();
        for entity in self.signals.iter() {
            entity.signal.flip();
        }

        // Next tick's phase-0 pass only delivers to agents still alive,
        // either ticking now or still pending activation.
        let still_active: HashSet<AgentId> = self.agents.iter().map(|a| a.id()).collect();
        let still_pending: HashSet<AgentId> = self.pending_agents.keys().copied().collect();
        self.message_bus
            .deliver_phase(|id| still_active.contains(&id) || still_pending.contains(&id));

        // Phase 4: aura rebuild. Every worker thread from phase 1 has
        // already joined by the time `run_tick` returned, so no reader can
        // ever observe a mid-rebuild index (spec.md §4.H) without a
        // dedicated guard flag — the phase ordering itself is the guard.
        {
            let store = self.agent_store.lock().expect("AgentStore mutex poisoned");
            let entries: Vec<AuraEntry> = self
                .agents
                .iter()
                .filter(|a| !a.is_non_spatial())
                .map(|a| AuraEntry {
                    agent: a.id(),
                    position: store.position(a.id()),
                    lane: store.lane(a.id()),
                    dist_on_segment_cm: store.dist_on_segment(a.id()),
                })
                .collect();
            self.aura.rebuild(entries);
        }

        // Phase 5: manage entities. Drop finished agents, activate due ones.
        self.agents.retain(|a| {
            !matches!(
                agent_results.get(&a.id()),
                Some(UpdateStatus::Done) | Some(UpdateStatus::RemoveAndContinueGroup)
            )
        });
        for due in self.start_queue.pop_eligible(tick) {
            if let Some(mut entity) = self.pending_agents.remove(&due) {
                entity.frame_init(tick);
                self.agents.insert(entity);
            }
        }

        self.clock.advance();
        Ok(())
    }

    fn apply_intents(&mut self, agent: AgentId, intents: Vec<Intent>, now: Tick, tick_duration_secs: u32) {
        for intent in intents {
            match intent {
                // The kernel ticks every `Active` entity every frame — there
                // is no separate wake queue to push into, unlike the old
                // event-driven `Sim`.
                Intent::WakeAt(_) => {}
                Intent::TravelTo { destination, mode } => {
                    if let Err(e) = self.mobility.begin_travel(
                        agent,
                        destination,
                        mode,
                        now,
                        tick_duration_secs,
                        &self.network,
                    ) {
                        tracing::warn!(agent = agent.0, error = %e, "routing failed, agent remains stationary");
                    }
                }
                Intent::SendMessage { to, payload } => {
                    if let Err(e) = self.message_bus.post(agent, to, payload) {
                        tracing::warn!(agent = agent.0, target = to.0, error = %e, "message post rejected");
                    }
                }
            }
        }
    }
}
