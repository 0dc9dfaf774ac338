use std::time::Duration;

use reqwest::StatusCode;
use sofia_core::constants::DEFAULT_SYSTEM_PROMPT;
use sofia_core::{env_parse_with_default, env_var_any};

use crate::error::LlmError;
use crate::gemini_types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};

/// Default Gemini API origin.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default Gemini model to use.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
/// Default request timeout. Overridable with `SOFIA_LLM_TIMEOUT_SECS`.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Environment variables consulted for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "VITE_GEMINI_API_KEY"];
/// The only status that is retried.
pub const RETRY_STATUS: StatusCode = StatusCode::SERVICE_UNAVAILABLE;
/// Fixed pauses before the second and third attempt.
pub const RETRY_DELAYS: [Duration; 2] = [Duration::from_millis(300), Duration::from_millis(800)];

/// Client for Gemini `generateContent` calls.
pub struct LlmClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) model: String,
    pub(crate) generation: GenerationConfig,
    pub(crate) system_instruction: Option<String>,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("client", &self.client)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// Creates a new client with the given API key and base URL.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(api_key: String, base_url: String) -> Result<Self, LlmError> {
        let timeout = env_parse_with_default("SOFIA_LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let base_url = base_url.trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(|e| LlmError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            base_url,
            model: DEFAULT_MODEL.to_owned(),
            generation: GenerationConfig::default(),
            system_instruction: None,
        })
    }

    /// Client configured from `GEMINI_API_KEY`, `SOFIA_GEMINI_URL`,
    /// `SOFIA_GEMINI_MODEL` and `SOFIA_SYSTEM_PROMPT`. `None` without a key.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_env() -> Result<Option<Self>, LlmError> {
        let Some(api_key) = env_var_any(&API_KEY_VARS) else {
            return Ok(None);
        };
        let base_url =
            env_var_any(&["SOFIA_GEMINI_URL"]).unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let model = env_var_any(&["SOFIA_GEMINI_MODEL"]).unwrap_or_else(|| DEFAULT_MODEL.to_owned());
        let instruction = env_var_any(&["SOFIA_SYSTEM_PROMPT"])
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_owned());
        let client =
            Self::new(api_key, base_url)?.with_model(model).with_system_instruction(Some(instruction));
        Ok(Some(client))
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn with_system_instruction(mut self, instruction: Option<String>) -> Self {
        self.system_instruction = instruction.filter(|s| !s.trim().is_empty());
        self
    }

    #[must_use]
    pub const fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `generateContent` URL without the key query parameter.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Builds a single-turn request. `context` is appended to the system instruction.
    #[must_use]
    pub fn build_request(&self, message: &str, context: Option<&str>) -> GenerateContentRequest {
        let context = context.map(str::trim).filter(|c| !c.is_empty());
        let instruction = match (self.system_instruction.as_deref(), context) {
            (Some(base), Some(extra)) => Some(format!("{base}\n\n{extra}")),
            (Some(base), None) => Some(base.to_owned()),
            (None, Some(extra)) => Some(extra.to_owned()),
            (None, None) => None,
        };
        GenerateContentRequest {
            contents: vec![Content::user(message)],
            system_instruction: instruction.map(Content::instruction),
            generation_config: self.generation,
        }
    }

    /// Sends `request`, retrying on 503 after each of [`RETRY_DELAYS`].
    ///
    /// Returns the last response received, whatever its status. Only transport
    /// failures are errors.
    ///
    /// # Errors
    /// Returns [`LlmError::HttpRequest`] if the request could not be sent.
    pub async fn send_with_backoff(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<reqwest::Response, LlmError> {
        let url = self.endpoint();
        let mut attempt = 0usize;
        loop {
            let response = self
                .client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(request)
                .send()
                .await?;

            if response.status() != RETRY_STATUS {
                return Ok(response);
            }
            let Some(delay) = RETRY_DELAYS.get(attempt) else {
                return Ok(response);
            };
            attempt += 1;
            tracing::warn!(
                "Gemini returned {RETRY_STATUS}, retry {attempt}/{} after {delay:?}",
                RETRY_DELAYS.len()
            );
            tokio::time::sleep(*delay).await;
        }
    }

    /// Sends one user message and returns the model's text.
    ///
    /// # Errors
    /// Returns an error if the request fails, the API answers with a non-success
    /// status, the body is not valid JSON, or no text was produced.
    pub async fn generate_text(
        &self,
        message: &str,
        context: Option<&str>,
    ) -> Result<String, LlmError> {
        let request = self.build_request(message, context);
        let response = self.send_with_backoff(&request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::HttpStatus { code: status.as_u16(), body });
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::JsonParse {
                context: format!("generateContent response (body: {})", truncate(&body, 200)),
                source: e,
            })?;

        parsed.first_text().map(ToOwned::to_owned).ok_or(LlmError::EmptyResponse)
    }
}

/// Truncates a string to at most `max_len` bytes at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
