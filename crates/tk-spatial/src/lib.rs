//! `tk-spatial` — road network, spatial indexing, and routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `RoadNetwork` (CSR + R-tree), `RoadNetworkBuilder`          |
//! | [`router`]  | `Router` trait, `Route`, `DijkstraRouter`                  |
//! | [`lane`]    | `LaneRules`, `RoadTopology` (segments/lanes/connectors/…)  |
//! | [`aura`]    | `AuraManager` trait + `GridAura`/`RTreeAura`/`SimTreeAura` |
//! | [`osm`]     | `load_from_pbf` (feature = `"osm"` only)                   |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `osm`   | Enables OSM PBF loading via the `osmpbf` crate.             |
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod aura;
pub mod error;
pub mod lane;
pub mod network;
pub mod router;

#[cfg(feature = "osm")]
pub mod osm;


pub use aura::{AgentFilter, AuraBackend, AuraEntry, AuraManager, GridAura, RTreeAura, SimTreeAura};
pub use error::{SpatialError, SpatialResult};
pub use lane::{
    BusStop, Crossing, Lane, LaneConnector, LaneRules, Link, RoadSegment, RoadTopology,
    RoadTopologyBuilder, TurningConflict, TurningGroup, TurningPath,
};
pub use network::{RoadNetwork, RoadNetworkBuilder};
pub use router::{DijkstraRouter, Route, Router};
