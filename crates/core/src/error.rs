use std::result::Result as StdResult;

use thiserror::Error;

/// Errors raised by core domain parsing.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("invalid day key: {0}")]
    InvalidDayKey(String),

    #[error("invalid timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = StdResult<T, CoreError>;
