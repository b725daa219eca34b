//! Simulation time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter — one
//! tick is one simulation frame. The mapping to wall-clock time is held in
//! `SimClock`:
//!
//!   wall_time = start_unix_secs + tick * tick_duration_millis / 1000
//!
//! Using an integer tick as the canonical time unit means all schedule and
//! signal-timing arithmetic is exact (no floating-point drift across runs
//! with different worker counts) and comparisons are O(1).
//!
//! The default frame length is 100 ms, the standard microsimulation
//! granularity fine enough to resolve car-following and signal-phase
//! transitions. `tick_duration_millis` must evenly divide 1000 (or be a
//! multiple of it) so that schedule times expressed in whole seconds always
//! land on a tick boundary.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
///
/// Stored as `u64` to avoid overflow: at 1 tick/second and 1 s per tick, a
/// u64 lasts ~585 billion years.  At the default 1 tick/hour it lasts far
/// longer than any conceivable run.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and Unix wall-clock seconds.
///
/// `SimClock` is cheap to copy and intentionally holds no heap data.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Unix timestamp (seconds since epoch) of tick 0.
    pub start_unix_secs: i64,
    /// How many real milliseconds one tick represents.  Default: 100.
    pub tick_duration_millis: u32,
    /// The current tick — advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    /// Create a clock starting at `start_unix_secs` with the given resolution.
    pub fn new(start_unix_secs: i64, tick_duration_millis: u32) -> Self {
        Self {
            start_unix_secs,
            tick_duration_millis,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulated milliseconds since tick 0.
    #[inline]
    pub fn elapsed_millis(&self) -> i64 {
        self.current_tick.0 as i64 * self.tick_duration_millis as i64
    }

    /// Elapsed simulated seconds since tick 0 (truncating any sub-second
    /// remainder — use [`SimClock::elapsed_millis`] for exact arithmetic).
    #[inline]
    pub fn elapsed_secs(&self) -> i64 {
        self.elapsed_millis() / 1000
    }

    /// Current Unix timestamp corresponding to `current_tick`.
    #[inline]
    pub fn current_unix_secs(&self) -> i64 {
        self.start_unix_secs + self.elapsed_secs()
    }

    /// Break elapsed time into (day, hour, minute) components from sim start.
    /// Useful for human-readable logging without a datetime library.
    pub fn elapsed_dhm(&self) -> (u64, u32, u32) {
        let total_secs = self.elapsed_secs().max(0) as u64;
        let days = total_secs / 86_400;
        let hours = ((total_secs % 86_400) / 3_600) as u32;
        let minutes = ((total_secs % 3_600) / 60) as u32;
        (days, hours, minutes)
    }

    // ── Tick-count helpers ────────────────────────────────────────────────

    /// How many ticks span `millis` milliseconds? (rounds up — an agent
    /// scheduled to act at this offset never fires early)
    #[inline]
    pub fn ticks_for_millis(&self, millis: u64) -> u64 {
        millis.div_ceil(self.tick_duration_millis as u64)
    }

    #[inline]
    pub fn ticks_for_secs(&self, secs: u64) -> u64 {
        self.ticks_for_millis(secs * 1000)
    }

    #[inline]
    pub fn ticks_for_hours(&self, hours: u64) -> u64 {
        self.ticks_for_secs(hours * 3_600)
    }

    #[inline]
    pub fn ticks_for_days(&self, days: u64) -> u64 {
        self.ticks_for_secs(days * 86_400)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (d, h, m) = self.elapsed_dhm();
        write!(f, "{} (day {} {:02}:{:02})", self.current_tick, d, h, m)
    }
}

// ── WorkerCounts ──────────────────────────────────────────────────────────────

/// How many OS worker threads to allocate to each of the three concurrently
/// ticked entity populations.
///
/// The kernel runs three independently partitioned, independently threaded
/// work groups every tick: person agents (drivers, pedestrians, transit
/// riders), traffic signals, and communication-layer entities (e.g. roadside
/// units relaying messages). Each group's worker count is tuned separately
/// because the three populations have very different per-entity costs.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkerCounts {
    pub person: usize,
    pub signal: usize,
    pub communication: usize,
}

impl WorkerCounts {
    /// Single-threaded: one worker per group. Used for the deterministic
    /// debug mode that must reproduce N-worker output byte-for-byte.
    pub const SINGLE_THREADED: WorkerCounts = WorkerCounts {
        person: 1,
        signal: 1,
        communication: 1,
    };

    #[inline]
    pub fn total(&self) -> usize {
        self.person + self.signal + self.communication
    }
}

impl Default for WorkerCounts {
    fn default() -> Self {
        Self::SINGLE_THREADED
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically loaded from a TOML/JSON file by the application crate and passed
/// to the simulation runner.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Unix timestamp for tick 0 (e.g. a Monday 00:00 local time).
    pub start_unix_secs: i64,

    /// Milliseconds per tick.  Must evenly divide 1000 or be a multiple of
    /// it for schedule arithmetic to remain exact.  Default: 100.
    pub tick_duration_millis: u32,

    /// Total ticks to simulate.  For 2 hours at 100 ms/tick: 2*3600*10 = 72000.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Worker thread counts for the person/signal/communication work groups.
    /// `WorkerCounts::SINGLE_THREADED` forces the deterministic debug mode.
    pub workers: WorkerCounts,

    /// Write output every N ticks.  1 = every tick; 600 = once per minute
    /// (at 100 ms resolution).
    pub output_interval_ticks: u64,
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.start_unix_secs, self.tick_duration_millis)
    }

    /// Validate the tick-duration/schedule contract: `tick_duration_millis`
    /// must divide 1000 evenly, or be an exact multiple of it. Violated only
    /// by misconfiguration, so this is a rejected-config error, not a panic.
    pub fn validate(&self) -> Result<(), crate::DtError> {
        let ms = self.tick_duration_millis;
        if ms == 0 {
            return Err(crate::DtError::Config(
                "tick_duration_millis must be non-zero".into(),
            ));
        }
        let divides_evenly = 1000 % ms == 0;
        let multiple_of_second = ms % 1000 == 0;
        if !divides_evenly && !multiple_of_second {
            return Err(crate::DtError::Config(format!(
                "tick_duration_millis ({ms}) must evenly divide 1000 or be a multiple of it"
            )));
        }
        if self.workers.person == 0 || self.workers.signal == 0 || self.workers.communication == 0
        {
            return Err(crate::DtError::Config(
                "each work group needs at least one worker".into(),
            ));
        }
        Ok(())
    }
}
