//! Trip chains: the ordered sequence of `Activity`/`Trip` items that make up
//! one agent's day (spec.md §3).
//!
//! A chain is validated once, at construction, against the invariants listed
//! in spec.md §3:
//!
//! - sequence numbers strictly ascending;
//! - each `Activity`'s `end_tick >= start_tick`;
//! - each `Trip` has at least one `SubTrip`;
//! - the chain's first `Activity`'s `start_tick` matches the agent's
//!   `start_tick` (checked by the caller, since the agent's own start tick
//!   lives outside this crate — see `TripChain::validate_against_start`).

use tk_core::{NodeId, Tick, TransportMode};

use crate::{ScheduleError, ScheduleResult};

// ── Location ─────────────────────────────────────────────────────────────────

/// Where a `Trip` begins or ends, or where an `Activity` takes place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocationType {
    Node(NodeId),
    Home,
    Work,
}

impl LocationType {
    pub fn node_id(self) -> Option<NodeId> {
        match self {
            LocationType::Node(n) => Some(n),
            _ => None,
        }
    }
}

// ── Activity ─────────────────────────────────────────────────────────────────

/// An activity performed at a fixed location for an interval of ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Activity {
    pub sequence: u32,
    pub location: LocationType,
    /// Application-defined activity type (work, shop, leisure, …).
    pub activity_type: u16,
    pub is_primary: bool,
    pub is_flexible: bool,
    pub is_mandatory: bool,
    pub start_tick: Tick,
    pub end_tick: Tick,
}

// ── SubTrip ──────────────────────────────────────────────────────────────────

/// One leg of a `Trip`: a single mode from one point to the next.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubTrip {
    /// Assigned by `TripChain::new` — dense, ascending within the whole chain.
    pub sub_trip_seq: u32,
    pub mode: TransportMode,
    pub is_primary_mode: bool,
    /// Transit line identifier; `None` for non-transit modes.
    pub line: Option<u32>,
}

impl SubTrip {
    pub fn is_transit(&self) -> bool {
        self.mode == TransportMode::Transit
    }
}

// ── Trip ─────────────────────────────────────────────────────────────────────

/// A journey between two locations, composed of one or more `SubTrip`s
/// (e.g. walk → bus → walk).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trip {
    pub sequence: u32,
    pub from: LocationType,
    pub to: LocationType,
    pub sub_trips: Vec<SubTrip>,
}

// ── TripChainItem ────────────────────────────────────────────────────────────

/// One entry in a `TripChain`: either an `Activity` or a `Trip`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TripChainItem {
    Activity(Activity),
    Trip(Trip),
}

impl TripChainItem {
    pub fn sequence(&self) -> u32 {
        match self {
            TripChainItem::Activity(a) => a.sequence,
            TripChainItem::Trip(t) => t.sequence,
        }
    }
}

/// The kind of a trip-chain item, used as half of the `RoleFactory` lookup
/// key in `tk-roles` (spec.md §4.J).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum TripItemKind {
    Activity,
    Trip,
    /// A transit sub-trip's inserted wait — not a literal chain item, but
    /// synthesized by the dispatcher when a `Trip`'s next sub-trip is
    /// transit (spec.md §4.J).
    WaitForTransit,
}

// ── TripChain ────────────────────────────────────────────────────────────────

/// An agent's full, finite day: an ordered sequence of `Activity`/`Trip`
/// items, validated at construction.
#[derive(Clone, Debug, Default)]
pub struct TripChain {
    items: Vec<TripChainItem>,
}

impl TripChain {
    /// Validate and wrap `items` into a `TripChain`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidChain`] if:
    /// - `items` is empty;
    /// - sequence numbers are not strictly ascending;
    /// - an `Activity.end_tick < start_tick`;
    /// - a `Trip` has zero `SubTrip`s.
    pub fn new(items: Vec<TripChainItem>) -> ScheduleResult<Self> {
        if items.is_empty() {
            return Err(ScheduleError::InvalidChain("trip chain must have at least one item".into()));
        }
        let mut last_seq: Option<u32> = None;
        for item in &items {
            let seq = item.sequence();
            if let Some(prev) = last_seq {
                if seq <= prev {
                    return Err(ScheduleError::InvalidChain(format!(
                        "sequence numbers must be strictly ascending (got {seq} after {prev})"
                    )));
                }
            }
            last_seq = Some(seq);

            match item {
                TripChainItem::Activity(a) => {
                    if a.end_tick < a.start_tick {
                        return Err(ScheduleError::InvalidChain(format!(
                            "activity {} has end_tick < start_tick",
                            a.sequence
                        )));
                    }
                }
                TripChainItem::Trip(t) => {
                    if t.sub_trips.is_empty() {
                        return Err(ScheduleError::InvalidChain(format!(
                            "trip {} has no sub-trips",
                            t.sequence
                        )));
                    }
                }
            }
        }
        Ok(Self { items })
    }

    /// Confirm the chain's first activity begins at `agent_start_tick`
    /// (spec.md §3: "the chain's first startTime matches the agent's
    /// startTime"). The agent's own start tick is tracked outside this
    /// crate, so this is a separate check rather than part of `new`.
    pub fn validate_against_start(&self, agent_start_tick: Tick) -> ScheduleResult<()> {
        match self.items.first() {
            Some(TripChainItem::Activity(a)) if a.start_tick == agent_start_tick => Ok(()),
            Some(TripChainItem::Activity(a)) => Err(ScheduleError::InvalidChain(format!(
                "first activity starts at {:?}, agent starts at {:?}",
                a.start_tick, agent_start_tick
            ))),
            Some(TripChainItem::Trip(_)) => Err(ScheduleError::InvalidChain(
                "trip chain must begin with an Activity".into(),
            )),
            None => unreachable!("TripChain::new rejects empty chains"),
        }
    }

    pub fn items(&self) -> &[TripChainItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&TripChainItem> {
        self.items.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn trip(seq: u32, modes: &[TransportMode]) -> TripChainItem {
        TripChainItem::Trip(Trip {
            sequence: seq,
            from: LocationType::Home,
            to: LocationType::Work,
            sub_trips: modes
                .iter()
                .enumerate()
                .map(|(i, &mode)| SubTrip {
                    sub_trip_seq: i as u32,
                    mode,
                    is_primary_mode: i == 0,
                    line: None,
                })
                .collect(),
        })
    }

    #[test]
    fn valid_chain_constructs() {
        let chain = TripChain::new(vec![
            activity(0, 0, 100),
            trip(1, &[TransportMode::Car]),
            activity(2, 200, 300),
        ])
        .unwrap();
        assert_eq!(chain.len(), 3);
        chain.validate_against_start(Tick(0)).unwrap();
    }

    #[test]
    fn rejects_non_ascending_sequence() {
        let err = TripChain::new(vec![activity(1, 0, 10), activity(0, 20, 30)]);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_empty_trip() {
        let trip_with_no_subtrips = TripChainItem::Trip(Trip {
            sequence: 1,
            from: LocationType::Home,
            to: LocationType::Work,
            sub_trips: vec![],
        });
        let err = TripChain::new(vec![activity(0, 0, 10), trip_with_no_subtrips]);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_end_before_start() {
        let err = TripChain::new(vec![activity(0, 50, 10)]);
        assert!(err.is_err());
    }

    #[test]
    fn transit_subtrip_flag() {
        let chain = TripChain::new(vec![
            activity(0, 0, 10),
            trip(1, &[TransportMode::Walk, TransportMode::Transit, TransportMode::Walk]),
        ])
        .unwrap();
        if let Some(TripChainItem::Trip(t)) = chain.item(1) {
            assert!(!t.sub_trips[0].is_transit());
            assert!(t.sub_trips[1].is_transit());
        } else {
            panic!("expected trip");
        }
    }
}
