//! `tk-core` — foundational types for the traffic kernel.
//!
//! This crate is a dependency of every other `tk-*` crate. It intentionally
//! has no `tk-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                |
//! |---------------|----------------------------------------------------------|
//! | [`ids`]       | `AgentId`, `NodeId`, `SegmentId`, `LaneRef`, `SignalId`… |
//! | [`geo`]       | `GeoPoint` (authored network coords), `Point2d` (cm plane)|
//! | [`time`]      | `Tick`, `SimClock`, `SimConfig`, `WorkerCounts`          |
//! | [`rng`]       | `AgentRng` (per-agent), `SimRng` (global)                |
//! | [`transport`] | `TransportMode` enum                                     |
//! | [`buffered`]  | `BufferedCell<T>`, `SyncBufferedCell<T>`, `MutexStrategy`|
//! | [`error`]     | `DtError`, `DtResult`                                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required by `tk-output`'s config loader.                   |

pub mod buffered;
pub mod error;
pub mod geo;
pub mod ids;
pub mod lifecycle;
pub mod rng;
pub mod time;
pub mod transport;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use buffered::{BufferedCell, MutexStrategy, SyncBufferedCell};
pub use error::{DtError, DtResult};
pub use lifecycle::{LifecycleState, UpdateStatus};
pub use geo::{GeoPoint, Point2d};
pub use ids::{
    ActivityId, AgentId, BusStopId, ConnectorId, CrossingId, EdgeId, LaneId, LaneRef, LinkId,
    NodeId, PhaseId, SegmentId, SignalId, SplitPlanId, TurningConflictId, TurningGroupId,
    TurningPathId,
};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, SimConfig, Tick, WorkerCounts};
pub use transport::TransportMode;
