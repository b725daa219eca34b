use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid trip chain: {0}")]
    InvalidChain(String),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
