//! `tk-schedule` — agent trip chains: ordered activities and trips that
//! drive role dispatch over an agent's lifetime.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | [`trip`]  | `Activity`, `Trip`, `SubTrip`, `TripChain`, `TripChainItem` |
//! | [`error`] | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! A `TripChain` is the static, ordered plan an agent is constructed with;
//! [`tk_roles::Dispatcher`] walks it at runtime, swapping the agent's
//! [`tk_roles::Role`] as each item completes.

pub mod error;
pub mod trip;

pub use error::{ScheduleError, ScheduleResult};
pub use trip::{Activity, LocationType, SubTrip, Trip, TripChain, TripChainItem, TripItemKind};
