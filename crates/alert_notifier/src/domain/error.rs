use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("invalid mail address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to compose alert email: {0}")]
    Compose(String),

    #[error("mail transport error: {0}")]
    Transport(String),

    #[error("mail transmission timed out after {0:?}")]
    Timeout(std::time::Duration),
}

pub type Result<T> = std::result::Result<T, AlertError>;
