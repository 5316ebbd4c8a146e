//! Engine error type

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A `throw_stone` precondition was not met
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A physics tunable is non-finite or out of range
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
