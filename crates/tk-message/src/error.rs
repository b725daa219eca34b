use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("cannot post a message to the invalid-handler sentinel")]
    InvalidTarget,
}

pub type MessageResult<T> = Result<T, MessageError>;
