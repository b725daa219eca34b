use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("split plan choice set must have at least one plan")]
    EmptyChoiceSet,

    #[error("split plan cycle lengths must match: expected {expected} ms, got {actual} ms")]
    InconsistentCycleLength { expected: u32, actual: u32 },

    #[error("signal has no phases")]
    NoPhases,

    #[error("phase durations ({phases}) don't match phase count ({count})")]
    PhaseDurationMismatch { phases: usize, count: usize },
}

pub type SignalResult<T> = Result<T, SignalError>;
