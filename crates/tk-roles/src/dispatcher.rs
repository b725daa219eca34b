//! `Dispatcher` — advances an agent's role as its trip chain progresses.
//!
//! spec.md §4.J: when the current role reports done, the dispatcher moves to
//! the chain's next item, synthesizing a `WaitBusActivity` ahead of any
//! transit sub-trip, and retains the just-finished role as `prev_role` for
//! exactly one more tick (so anything reading role transitions mid-tick sees
//! both sides of the swap).

use tk_core::{AgentId, NodeId};
use tk_schedule::{TripChain, TripChainItem};

use crate::factory::RoleFactory;
use crate::role::Role;
use crate::SimContext;

/// Per-agent dispatcher state: the chain position plus the live role.
#[derive(Debug, Clone)]
pub struct AgentRoleState {
    pub role: Role,
    /// The role this agent was in immediately before this tick's swap, if
    /// any swap happened. Cleared at the start of the *next* tick's advance.
    pub prev_role: Option<Role>,
    item_index: usize,
    sub_trip_index: usize,
}

impl AgentRoleState {
    /// Start dispatching a freshly-activated agent's trip chain.
    ///
    /// The chain's first item is always an `Activity` (enforced by
    /// `TripChain::new`), so the starting role is always
    /// `Role::ActivityPerformer`.
    pub fn start(chain: &TripChain) -> Self {
        let role = match chain.item(0) {
            Some(TripChainItem::Activity(a)) => RoleFactory::for_activity(a),
            _ => unreachable!("TripChain::new guarantees the first item is an Activity"),
        };
        Self { role, prev_role: None, item_index: 0, sub_trip_index: 0 }
    }

    pub fn current_item_index(&self) -> usize {
        self.item_index
    }
}

pub struct Dispatcher;

impl Dispatcher {
    /// Advance `state` by one tick against `chain`. Returns `true` if the
    /// role changed (the chain progressed or a transit wait was inserted).
    pub fn advance(
        state: &mut AgentRoleState,
        chain: &TripChain,
        agent: AgentId,
        ctx: &SimContext<'_>,
    ) -> bool {
        state.prev_role = None;

        if !state.role.is_done(agent, ctx) {
            return false;
        }

        let finished = state.role.clone();

        // Waiting for transit: once boarded, become the Passenger for the
        // sub-trip we were waiting for — the chain position doesn't move.
        if matches!(finished, Role::WaitBusActivity(_)) {
            if let Some(TripChainItem::Trip(trip)) = chain.item(state.item_index) {
                if let Some(sub_trip) = trip.sub_trips.get(state.sub_trip_index) {
                    let destination = trip.to.node_id().unwrap_or(NodeId::INVALID);
                    state.role = RoleFactory::for_sub_trip(sub_trip, destination);
                    state.prev_role = Some(finished);
                    return true;
                }
            }
        }

        // Still inside a Trip item: try the next sub-trip.
        if let Some(TripChainItem::Trip(trip)) = chain.item(state.item_index) {
            let next_sub_trip_index = state.sub_trip_index + 1;
            if let Some(sub_trip) = trip.sub_trips.get(next_sub_trip_index) {
                state.sub_trip_index = next_sub_trip_index;
                let destination = trip.to.node_id().unwrap_or(NodeId::INVALID);
                state.role = if sub_trip.is_transit() {
                    RoleFactory::wait_for_transit(sub_trip, destination)
                } else {
                    RoleFactory::for_sub_trip(sub_trip, destination)
                };
                state.prev_role = Some(finished);
                return true;
            }
        }

        // Exhausted the current item (or it was an Activity): advance to
        // the next chain item.
        state.item_index += 1;
        state.sub_trip_index = 0;
        state.role = match chain.item(state.item_index) {
            Some(TripChainItem::Activity(a)) => RoleFactory::for_activity(a),
            Some(TripChainItem::Trip(trip)) => {
                let sub_trip = trip
                    .sub_trips
                    .first()
                    .expect("TripChain::new guarantees every Trip has >= 1 sub-trip");
                let destination = trip.to.node_id().unwrap_or(NodeId::INVALID);
                if sub_trip.is_transit() {
                    RoleFactory::wait_for_transit(sub_trip, destination)
                } else {
                    RoleFactory::for_sub_trip(sub_trip, destination)
                }
            }
            None => Role::Finished,
        };
        state.prev_role = Some(finished);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tk_agent::AgentStoreBuilder;
    use tk_core::{Tick, TransportMode};
    use tk_mobility::MobilityStore;
    use tk_schedule::{Activity, LocationType, SubTrip, Trip, TripChainItem};
    use tk_spatial::{AuraBackend, RoadNetworkBuilder};

    fn activity(seq: u32, start: u64, end: u64) -> TripChainItem {
        TripChainItem::Activity(Activity {
            sequence: seq,
            location: LocationType::Home,
            activity_type: 0,
            is_primary: true,
            is_flexible: false,
            is_mandatory: true,
            start_tick: Tick(start),
            end_tick: Tick(end),
        })
    }

    fn car_trip(seq: u32) -> TripChainItem {
        TripChainItem::Trip(Trip {
            sequence: seq,
            from: LocationType::Home,
            to: LocationType::Work,
            sub_trips: vec![SubTrip { sub_trip_seq: 0, mode: TransportMode::Car, is_primary_mode: true, line: None }],
        })
    }

    fn transit_trip(seq: u32) -> TripChainItem {
        TripChainItem::Trip(Trip {
            sequence: seq,
            from: LocationType::Home,
            to: LocationType::Work,
            sub_trips: vec![
                SubTrip { sub_trip_seq: 0, mode: TransportMode::Walk, is_primary_mode: false, line: None },
                SubTrip { sub_trip_seq: 1, mode: TransportMode::Transit, is_primary_mode: true, line: Some(7) },
                SubTrip { sub_trip_seq: 2, mode: TransportMode::Walk, is_primary_mode: false, line: None },
            ],
        })
    }

    struct Fixture {
        agents: tk_agent::AgentStore,
        network: tk_spatial::RoadNetwork,
        mobility: MobilityStore,
        aura: Box<dyn tk_spatial::AuraManager>,
    }

    impl Fixture {
        fn new() -> Self {
            let agents = AgentStoreBuilder::new(1).build();
            let network = RoadNetworkBuilder::new().build();
            let mobility = MobilityStore::new(1);
            let aura = AuraBackend::Grid.build();
            Self { agents, network, mobility, aura }
        }

        fn ctx(&self, tick: Tick, chains: &[TripChain]) -> SimContext<'_> {
            SimContext::new(tick, 60, &self.agents, &self.network, &self.mobility, self.aura.as_ref(), chains)
        }
    }

    #[test]
    fn activity_holds_until_end_tick_then_advances_to_trip() {
        let chain = TripChain::new(vec![activity(0, 0, 10), car_trip(1)]).unwrap();
        let fixture = Fixture::new();
        let mut state = AgentRoleState::start(&chain);
        let agent = AgentId(0);

        let ctx = fixture.ctx(Tick(5), &[]);
        assert!(!Dispatcher::advance(&mut state, &chain, agent, &ctx));
        assert!(matches!(state.role, Role::ActivityPerformer(_)));

        let ctx = fixture.ctx(Tick(10), &[]);
        assert!(Dispatcher::advance(&mut state, &chain, agent, &ctx));
        assert!(matches!(state.role, Role::Driver(_)));
        assert!(state.prev_role.is_some());
    }

    #[test]
    fn transit_sub_trip_inserts_wait_then_boards() {
        let chain = TripChain::new(vec![activity(0, 0, 0), transit_trip(1)]).unwrap();
        let fixture = Fixture::new();
        let mut state = AgentRoleState::start(&chain);
        let agent = AgentId(0);

        // Activity ends immediately; advance into the walk sub-trip.
        let ctx = fixture.ctx(Tick(0), &[]);
        assert!(Dispatcher::advance(&mut state, &chain, agent, &ctx));
        assert!(matches!(state.role, Role::Pedestrian(_)));

        // Pedestrian sub-trip finishes (not in transit) -> wait for transit.
        let ctx = fixture.ctx(Tick(1), &[]);
        assert!(Dispatcher::advance(&mut state, &chain, agent, &ctx));
        assert!(matches!(state.role, Role::WaitBusActivity(_)));

        // Board: dispatcher won't move until `boarded` flips via on_message.
        let ctx = fixture.ctx(Tick(2), &[]);
        assert!(!Dispatcher::advance(&mut state, &chain, agent, &ctx));
        state.role.on_message(AgentId(1), &[1]);
        assert!(Dispatcher::advance(&mut state, &chain, agent, &ctx));
        assert!(matches!(state.role, Role::Passenger(_)));
    }

    #[test]
    fn chain_exhaustion_becomes_finished() {
        let chain = TripChain::new(vec![activity(0, 0, 0)]).unwrap();
        let fixture = Fixture::new();
        let mut state = AgentRoleState::start(&chain);
        let ctx = fixture.ctx(Tick(0), &[]);
        assert!(Dispatcher::advance(&mut state, &chain, AgentId(0), &ctx));
        assert!(matches!(state.role, Role::Finished));
    }
}
