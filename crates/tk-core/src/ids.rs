//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` to allow
//! direct indexing into SoA `Vec`s via `id.0 as usize`, but callers should
//! prefer the `.index()` helpers for clarity.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" — equivalent to `u32::MAX`.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of an agent in SoA storage.  Max ~4.3 billion agents.
    pub struct AgentId(u32);
}

typed_id! {
    /// Index of a road-network node.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a directed road-network edge.
    pub struct EdgeId(u32);
}

typed_id! {
    /// Index of an activity type in the application's activity registry.
    /// Using `u16` keeps schedule arrays compact (max 65,535 activity types).
    pub struct ActivityId(u16);
}

typed_id! {
    /// Index of a directed road segment (the drivable unit between two nodes
    /// along a link, carrying one or more lanes).
    pub struct SegmentId(u32);
}

typed_id! {
    /// Index of a link — an ordered run of segments between two intersections
    /// that applications group for routing and display purposes.
    pub struct LinkId(u32);
}

typed_id! {
    /// Index of a lane within a segment's lane array.  Combined with a
    /// `SegmentId` to address a specific lane (see `LaneRef`).
    pub struct LaneId(u16);
}

typed_id! {
    /// Index of a lane connector — a permitted (from-lane, to-lane) pair
    /// across a node that a vehicle may cross on.
    pub struct ConnectorId(u32);
}

typed_id! {
    /// Index of a turning group — all connectors sharing one from-segment
    /// and one to-segment at a node, the unit signals grant right-of-way to.
    pub struct TurningGroupId(u32);
}

typed_id! {
    /// Index of a single turning path within a turning group.
    pub struct TurningPathId(u32);
}

typed_id! {
    /// Index of a turning conflict — a pair of turning paths whose swept
    /// areas intersect and therefore cannot both hold green simultaneously.
    pub struct TurningConflictId(u32);
}

typed_id! {
    /// Index of a pedestrian crossing at a node.
    pub struct CrossingId(u32);
}

typed_id! {
    /// Index of a bus stop along a segment.
    pub struct BusStopId(u32);
}

typed_id! {
    /// Index of a signalized intersection.
    pub struct SignalId(u32);
}

typed_id! {
    /// Index of a phase within a signal's fixed phase sequence.
    pub struct PhaseId(u16);
}

typed_id! {
    /// Index of a split plan within a signal's choice set.
    pub struct SplitPlanId(u16);
}

/// A specific lane on a specific segment — the addressing unit for
/// lane-level occupancy, queuing, and rule lookups.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneRef {
    pub segment: SegmentId,
    pub lane: LaneId,
}

impl LaneRef {
    #[inline]
    pub fn new(segment: SegmentId, lane: LaneId) -> Self {
        Self { segment, lane }
    }
}

impl Default for LaneRef {
    /// A lane ref with both fields set to their `INVALID` sentinel.
    fn default() -> Self {
        LaneRef::new(SegmentId::INVALID, LaneId::INVALID)
    }
}

impl fmt::Display for LaneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.segment, self.lane)
    }
}
