//! Wire shapes shared by the proxy endpoint and its clients.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/gemini`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRequest {
    #[serde(default)]
    pub message: String,
    /// Extra system-instruction context, e.g. the patient profile summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ProxyRequest {
    #[must_use]
    pub fn new(message: impl Into<String>, context: Option<String>) -> Self {
        Self { message: message.into(), context }
    }

    /// Context with surrounding whitespace removed, `None` when blank.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// Successful proxy response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyReply {
    pub text: String,
}
