//! `KernelConfig` — the kernel's external configuration surface (spec.md §6).
//!
//! Wraps [`tk_core::SimConfig`] (base tick granularity, total runtime, seed,
//! worker counts) with the kernel-specific knobs spec.md §6 names: warmup
//! ticks, per-group tick granularity, assignment strategy, aura-manager
//! backend choice, and the network source. Kept as a separate wrapper rather
//! than new `SimConfig` fields so `tk-core` stays free of `tk-spatial`/
//! `tk-sim` knowledge.
//!
//! Per-signal mutex strategy is not a field here: it is an argument to
//! [`tk_signal::Signal::new`], supplied by whatever builds a network's
//! signals (out of this crate's scope — see spec.md §1's "network loading"
//! Non-goal), not by the kernel itself.

use std::path::PathBuf;

use tk_core::SimConfig;
use tk_spatial::AuraBackend;

use crate::error::{SimError, SimResult};
use crate::workgroup::PartitionStrategy;

/// Where the sealed road network is loaded from (spec.md §6: "XML file path
/// or database DSN"). Parsing itself is out of the core's scope (§1
/// Non-goals); the kernel only needs to know which source was selected so
/// bootstrap code can route to the right loader.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NetworkSource {
    Xml(PathBuf),
    Database(String),
}

/// Per-population tick granularity (spec.md §4.E: "the worker services
/// entities due at ticks where `now % g == 0`"), expressed as a multiple of
/// `SimConfig::tick_duration_millis` so schedule arithmetic never drifts.
/// `1` means "every tick", matching `WorkerCounts::SINGLE_THREADED`'s
/// implicit granularity today.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupGranularity {
    pub person: u32,
    pub signal: u32,
    pub communication: u32,
}

impl Default for GroupGranularity {
    fn default() -> Self {
        Self { person: 1, signal: 1, communication: 1 }
    }
}

/// Top-level configuration the kernel validates and runs from — the
/// structured document named in spec.md §6's "Configuration (consumed)".
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KernelConfig {
    pub sim: SimConfig,

    /// Ticks of warmup to run before output is considered meaningful
    /// (spec.md §6). The kernel runs these ticks identically to any other —
    /// "warmup" only changes what bootstrap code does with the output, so
    /// the kernel itself just needs the count to validate against
    /// `total_ticks` and to expose via [`KernelConfig::is_warmup`].
    pub warmup_ticks: u64,

    pub granularity: GroupGranularity,
    pub assignment_strategy: PartitionStrategy,
    pub aura_backend: AuraBackend,
    pub network_source: NetworkSource,
}

impl KernelConfig {
    /// Reject configurations violating spec.md §6's contract: the base
    /// `SimConfig` constraints, plus every group granularity a positive
    /// integer multiple of the base granularity, plus `warmup_ticks` not
    /// exceeding `total_ticks`.
    pub fn validate(&self) -> SimResult<()> {
        self.sim.validate().map_err(|e| SimError::Config(e.to_string()))?;

        if self.warmup_ticks > self.sim.total_ticks {
            return Err(SimError::Config(format!(
                "warmup_ticks ({}) exceeds total_ticks ({})",
                self.warmup_ticks, self.sim.total_ticks
            )));
        }

        for (name, g) in [
            ("person", self.granularity.person),
            ("signal", self.granularity.signal),
            ("communication", self.granularity.communication),
        ] {
            if g == 0 {
                return Err(SimError::Config(format!(
                    "{name} group granularity must be a positive integer multiple of the base tick"
                )));
            }
        }

        Ok(())
    }

    /// `true` while `now` falls within the configured warmup window.
    #[inline]
    pub fn is_warmup(&self, now_tick: u64) -> bool {
        now_tick < self.warmup_ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tk_core::WorkerCounts;

    fn base_sim() -> SimConfig {
        SimConfig {
            start_unix_secs: 0,
            tick_duration_millis: 100,
            total_ticks: 1000,
            seed: 1,
            workers: WorkerCounts::SINGLE_THREADED,
            output_interval_ticks: 100,
        }
    }

    fn base_config() -> KernelConfig {
        KernelConfig {
            sim: base_sim(),
            warmup_ticks: 0,
            granularity: GroupGranularity::default(),
            assignment_strategy: PartitionStrategy::RoundRobin,
            aura_backend: AuraBackend::Grid,
            network_source: NetworkSource::Xml(PathBuf::from("net.xml")),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn warmup_exceeding_total_ticks_rejected() {
        let mut cfg = base_config();
        cfg.warmup_ticks = 2000;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_group_granularity_rejected() {
        let mut cfg = base_config();
        cfg.granularity.signal = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn is_warmup_boundary() {
        let mut cfg = base_config();
        cfg.warmup_ticks = 10;
        assert!(cfg.is_warmup(0));
        assert!(cfg.is_warmup(9));
        assert!(!cfg.is_warmup(10));
    }
}
