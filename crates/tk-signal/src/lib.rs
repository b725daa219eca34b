//! `tk-signal` — traffic signal cycle/phase/split-plan state machine and
//! loop-detector-driven adaptive replanning (spec.md §4.I).
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`color`]      | `TrafficColor`                                            |
//! | [`phase`]      | `Phase`                                                    |
//! | [`split`]      | `SplitPlan`, `SplitPlanChoiceSet`                          |
//! | [`offset`]     | `Offset`                                                   |
//! | [`detector`]   | `DetectorBank` — per-approach occupancy and DS             |
//! | [`replanner`]  | `Replanner` trait, `FixedReplanner`, `AdaptiveReplanner`, `AlgorithmFlag` |
//! | [`signal`]     | `Signal`, `PhaseCounter`                                   |
//! | [`error`]      | `SignalError`, `SignalResult<T>`                           |
//!
//! # Per-tick protocol
//!
//! `Signal::tick_update` runs during the kernel's update phase and writes to
//! the pending side of every buffered color cell; `Signal::flip` runs during
//! the flip phase and promotes pending to current. This mirrors the rest of
//! the kernel's double-buffering discipline (`tk-core::buffered`) even
//! though a signal's colors are the only state it publishes across workers.

pub mod color;
pub mod detector;
pub mod error;
pub mod offset;
pub mod phase;
pub mod replanner;
pub mod signal;
pub mod split;

#[cfg(test)]
mod tests;

pub use color::TrafficColor;
pub use detector::DetectorBank;
pub use error::{SignalError, SignalResult};
pub use offset::Offset;
pub use phase::Phase;
pub use replanner::{AdaptiveReplanner, AlgorithmFlag, FixedReplanner, Replanner};
pub use signal::{PhaseCounter, Signal};
pub use split::{SplitPlan, SplitPlanChoiceSet};
