use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoleError {
    #[error("no role factory rule matches trip-chain item: {0}")]
    NoMatchingFactory(String),

    #[error("trip chain exhausted for agent while a role was still expected")]
    ChainExhausted,
}

pub type RoleResult<T> = Result<T, RoleError>;
