use tk_core::{AgentId, Tick};
use tk_mobility::MobilityError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match agent count {expected}")]
    AgentCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("mobility error for agent: {0}")]
    Mobility(#[from] MobilityError),

    /// Spec.md §7's "runtime invariant violation" class: a worker wrote a
    /// foreign cell, a flip ran while readers were still active, or an
    /// entity was visited twice in one tick. Unlike every other variant,
    /// this one is never locally recoverable — the kernel identifies the
    /// offending tick/worker/entity and aborts (see
    /// [`abort_fatal`][crate::error::abort_fatal]), rather than returning
    /// this value to a caller that might try to continue.
    #[error("fatal invariant violation at tick {tick}: {detail} (worker={worker:?}, entity={entity:?})")]
    FatalInvariant {
        tick:   u64,
        worker: Option<usize>,
        entity: Option<u32>,
        detail: String,
    },
}

impl SimError {
    /// Build a [`SimError::FatalInvariant`] from typed identifiers.
    pub fn fatal_invariant(
        tick: Tick,
        worker: Option<usize>,
        entity: Option<AgentId>,
        detail: impl Into<String>,
    ) -> Self {
        SimError::FatalInvariant {
            tick: tick.0,
            worker,
            entity: entity.map(|a| a.0),
            detail: detail.into(),
        }
    }
}

/// Abort the kernel immediately on a fatal invariant violation (spec.md §7:
/// these are never locally recoverable). Logs the full diagnostic via
/// `tracing` before panicking, so it survives even if the panic message
/// itself is swallowed by a calling harness.
pub fn abort_fatal(err: SimError) -> ! {
    tracing::error!(error = %err, "fatal kernel invariant violation, aborting");
    panic!("{err}");
}

pub type SimResult<T> = Result<T, SimError>;
