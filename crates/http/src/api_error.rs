//! Typed API error for the proxy handlers.
//!
//! Every failure becomes a JSON body with an `error` field and the matching
//! status code, so browser callers can always parse the response.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sofia_llm::LlmError;

/// Proxy failure, in the order the handler checks for them.
#[derive(Debug)]
pub enum ApiError {
    /// 405: anything but `POST`.
    MethodNotAllowed,
    /// 500: no Gemini key configured. Never names the variables consulted.
    MissingSecret,
    /// 400: body is not a JSON object.
    InvalidJson,
    /// 400: `message` absent or blank.
    MissingMessage,
    /// 502: Gemini answered non-2xx, or could not be reached (`status` 0).
    Upstream { status: u16, detail: String },
    /// 502: Gemini answered 2xx without any text.
    EmptyResponse,
    /// 500: anything else.
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, serde_json::json!({"error": "Method not allowed"}))
            },
            Self::MissingSecret => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({"error": "Missing GEMINI_API_KEY"}),
            ),
            Self::InvalidJson => {
                (StatusCode::BAD_REQUEST, serde_json::json!({"error": "Invalid JSON body"}))
            },
            Self::MissingMessage => {
                (StatusCode::BAD_REQUEST, serde_json::json!({"error": "Missing message"}))
            },
            Self::Upstream { status, detail } => {
                tracing::warn!(upstream_status = status, "Gemini request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    serde_json::json!({
                        "error": "Gemini request failed",
                        "status": status,
                        "detail": detail,
                    }),
                )
            },
            Self::EmptyResponse => {
                tracing::warn!("Gemini returned no text");
                (StatusCode::BAD_GATEWAY, serde_json::json!({"error": "Empty response from model"}))
            },
            Self::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({"error": "Internal error", "message": err.to_string()}),
                )
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::HttpStatus { code, body } => Self::Upstream { status: code, detail: body },
            LlmError::HttpRequest(ref e) => {
                Self::Upstream { status: err.upstream_status(), detail: e.to_string() }
            },
            LlmError::EmptyResponse => Self::EmptyResponse,
            other => Self::Internal(other.into()),
        }
    }
}
