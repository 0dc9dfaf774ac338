//! Gemini client used by the proxy endpoint and by direct CLI chats.

mod client;
mod error;
mod gemini_types;


pub use client::{
    API_KEY_VARS, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, LlmClient, RETRY_DELAYS, RETRY_STATUS,
    truncate,
};
pub use error::LlmError;
pub use gemini_types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
