use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModemError {
    #[error("Payload must not be empty")]
    EmptyPayload,

    #[error("Payload of {len} bytes exceeds the {max}-byte frame limit")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ModemError>;
