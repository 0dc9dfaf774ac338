//! Sources of assistant replies.

use std::time::Duration;

use async_trait::async_trait;
use sofia_core::{ProxyReply, ProxyRequest, env_parse_with_default};
use sofia_llm::{DEFAULT_TIMEOUT_SECS, LlmClient};

use crate::error::ServiceError;

/// Path of the proxy endpoint, relative to the proxy origin.
pub const PROXY_PATH: &str = "/api/gemini";

/// Produces the full assistant text for one user message.
#[async_trait]
pub trait ReplyProvider: Send + Sync {
    async fn reply(&self, message: &str, context: Option<&str>) -> Result<String, ServiceError>;
}

/// Calls the proxy endpoint, which holds the Gemini secret.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ProxyClient {
    /// Client for the proxy served at `base_url`.
    ///
    /// Uses `SOFIA_LLM_TIMEOUT_SECS` as the request timeout.
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        let timeout = env_parse_with_default("SOFIA_LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let client = reqwest::Client::builder().timeout(Duration::from_secs(timeout)).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{PROXY_PATH}", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReplyProvider for ProxyClient {
    async fn reply(&self, message: &str, context: Option<&str>) -> Result<String, ServiceError> {
        let body = ProxyRequest::new(message, context.map(str::to_owned));
        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ServiceError::Proxy { status: status.as_u16(), detail });
        }

        let raw = response.text().await?;
        let reply: ProxyReply = serde_json::from_str(&raw)?;
        if reply.text.trim().is_empty() {
            return Err(ServiceError::EmptyReply);
        }
        Ok(reply.text)
    }
}

#[async_trait]
impl ReplyProvider for LlmClient {
    async fn reply(&self, message: &str, context: Option<&str>) -> Result<String, ServiceError> {
        Ok(self.generate_text(message, context).await?)
    }
}
