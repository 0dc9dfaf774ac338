//! HTTP proxy for sofia-chat.
//!
//! Holds the Gemini key server-side and exposes a single JSON endpoint that
//! browser and CLI clients call instead of Gemini itself.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(clippy::absolute_paths, reason = "Explicit paths for clarity")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]
#![allow(clippy::single_call_fn, reason = "HTTP handlers are called once from router")]

pub mod api_error;
mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use sofia_llm::{LlmClient, LlmError};
use tower_http::cors::CorsLayer;

/// Shared state for the proxy handlers.
pub struct AppState {
    /// `None` when no key is configured; every proxy call then fails with 500.
    pub llm: Option<Arc<LlmClient>>,
}

impl AppState {
    #[must_use]
    pub const fn new(llm: Option<Arc<LlmClient>>) -> Self {
        Self { llm }
    }

    /// Builds the Gemini client from the environment.
    ///
    /// A missing key is not an error here: the server still starts and
    /// reports the problem per request.
    pub fn from_env() -> Result<Self, LlmError> {
        let Some(llm) = LlmClient::from_env()? else {
            tracing::warn!("Gemini API key not configured, proxy requests will fail");
            return Ok(Self::new(None));
        };
        tracing::info!(model = llm.model(), base_url = llm.base_url(), "Gemini client ready");
        Ok(Self::new(Some(Arc::new(llm))))
    }
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/version", get(version))
        .route(
            "/api/gemini",
            post(handlers::gemini::generate).fallback(handlers::gemini::method_not_allowed),
        )
        .route(
            "/api/chat",
            post(handlers::gemini::generate).fallback(handlers::gemini::method_not_allowed),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse { version: env!("CARGO_PKG_VERSION") })
}
