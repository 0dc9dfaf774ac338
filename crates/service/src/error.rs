//! Typed error enum for the service layer.
//!
//! Unifies storage, LLM and proxy failures so callers can match on the
//! failure mode instead of downcasting opaque `anyhow::Error` boxes.

use sofia_llm::LlmError;
use sofia_storage::StorageError;
use thiserror::Error;

/// Service-layer error unifying storage, LLM and proxy failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Direct Gemini call failed.
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    /// Proxy answered with a non-success status.
    #[error("proxy returned {status}: {detail}")]
    Proxy { status: u16, detail: String },

    /// Proxy could not be reached.
    #[error("proxy transport: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered but produced no text.
    #[error("empty reply from provider")]
    EmptyReply,

    /// The caller's chunk callback failed.
    #[error("chunk callback: {0}")]
    Callback(#[source] anyhow::Error),

    /// Serialization/deserialization failed in the service layer.
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Llm(e) => e.is_transient(),
            Self::Proxy { status, .. } => *status == 429 || *status >= 500,
            Self::Transport(_) | Self::EmptyReply => true,
            Self::Callback(_) | Self::Serialization(_) => false,
        }
    }

    /// Whether the failure came from the reply provider rather than from
    /// storage or the caller.
    pub const fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::Llm(_) | Self::Proxy { .. } | Self::Transport(_) | Self::EmptyReply
        )
    }
}
