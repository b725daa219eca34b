//! `RoleFactory` — builds the `Role` for the next trip-chain item.
//!
//! Keyed conceptually on `(TripItemKind, Option<TransportMode>)` (spec.md
//! §4.J); in practice each trip-chain item type carries enough information
//! to build its role directly, so the "key" is expressed as the choice of
//! constructor function rather than a literal lookup table.

use tk_core::{NodeId, TransportMode};
use tk_schedule::{Activity, SubTrip};

use crate::role::{ActivityState, Role, TravelState, WaitBusState};

pub struct RoleFactory;

impl RoleFactory {
    /// Build the stationary role for an `Activity` chain item.
    pub fn for_activity(activity: &Activity) -> Role {
        Role::ActivityPerformer(ActivityState { until_tick: activity.end_tick })
    }

    /// Build the travelling role for one `SubTrip` of a `Trip` chain item.
    ///
    /// `destination` is the node the sub-trip ends at; transit sub-trips end
    /// at the stop node, not the trip's final destination.
    pub fn for_sub_trip(sub_trip: &SubTrip, destination: NodeId) -> Role {
        let travel = TravelState {
            sub_trip_seq: sub_trip.sub_trip_seq,
            destination,
            mode: sub_trip.mode,
            line: sub_trip.line,
            departed: false,
        };
        match sub_trip.mode {
            TransportMode::Car => Role::Driver(travel),
            TransportMode::Transit => Role::Passenger(travel),
            TransportMode::Walk | TransportMode::Bike | _ => Role::Pedestrian(travel),
        }
    }

    /// Build the dedicated operator role for a transit vehicle run.
    ///
    /// Bus drivers are not produced from an agent's own trip chain — they
    /// are assigned directly by whatever populates the transit-operator
    /// agent population — but share the same `TravelState` shape as a
    /// personal-vehicle driver.
    pub fn for_bus_driver(line: u32, destination: NodeId) -> Role {
        Role::BusDriver(TravelState {
            sub_trip_seq: 0,
            destination,
            mode: TransportMode::Car,
            line: Some(line),
            departed: false,
        })
    }

    /// Build the wait-for-transit role the dispatcher inserts ahead of a
    /// transit `SubTrip` (spec.md §4.J).
    pub fn wait_for_transit(sub_trip: &SubTrip, stop_node: NodeId) -> Role {
        Role::WaitBusActivity(WaitBusState { line: sub_trip.line, destination: stop_node, boarded: false })
    }
}
