//! Typed error enum for the LLM crate.

use thiserror::Error;

/// Errors from Gemini API operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("empty response: model returned no text")]
    EmptyResponse,
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

/// The request URL carries the API key in its query, so it is dropped
/// before the error can be stored or displayed.
impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        Self::HttpRequest(e.without_url())
    }
}

impl LlmError {
    /// Whether this error is transient and worth retrying later.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(_) => true,
            Self::HttpStatus { code, .. } => matches!(code, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Upstream HTTP status, `0` when the request never got a response.
    #[must_use]
    pub fn upstream_status(&self) -> u16 {
        match self {
            Self::HttpStatus { code, .. } => *code,
            Self::HttpRequest(e) => e.status().map_or(0, |s| s.as_u16()),
            _ => 0,
        }
    }
}
