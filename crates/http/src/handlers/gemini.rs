use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use sofia_core::{ProxyReply, ProxyRequest};

use crate::AppState;
use crate::api_error::ApiError;

/// `POST /api/gemini`: forwards one message to Gemini and returns its text.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ProxyReply>, ApiError> {
    let Some(llm) = state.llm.as_ref() else {
        return Err(ApiError::MissingSecret);
    };
    let request: ProxyRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Rejecting unparseable body");
        ApiError::InvalidJson
    })?;
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::MissingMessage);
    }

    let text = llm.generate_text(message, request.context()).await?;
    tracing::debug!(chars = text.chars().count(), "Proxied reply");
    Ok(Json(ProxyReply { text }))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
