//! Error types for the LLM layer

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when using LLM providers
#[derive(Debug, Error)]
pub enum LlmError {
    /// Missing or rejected API key
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// HTTP request failures
    #[error("HTTP error (status {status}): {body}")]
    HttpError { status: u16, body: String },

    /// SSE stream parsing failures
    #[error("Stream error: {0}")]
    StreamError(String),

    /// JSON encoding/decoding issues
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded (retry after {retry_after:?})")]
    RateLimitExceeded { retry_after: Option<Duration> },

    /// Provider-specific errors
    #[error("Provider error ({code}): {message}")]
    ProviderError { code: String, message: String },

    /// The model answered but produced no text
    #[error("Model {model} returned an empty response")]
    EmptyResponse { model: String },

    /// Every model in the cascade was unavailable
    #[error("All models unavailable (tried: {})", attempted.join(", "))]
    AllModelsUnavailable { attempted: Vec<String> },
}

impl LlmError {
    /// Whether the next model in a cascade should be tried.
    ///
    /// Overloaded (503), unknown (404) and rate-limited models are skipped, as is
    /// any provider message carrying the `UNAVAILABLE` status. Empty answers are
    /// skipped too.
    pub fn is_retryable_model_failure(&self) -> bool {
        match self {
            LlmError::HttpError { status, body } => {
                matches!(status, 404 | 503) || body.contains("UNAVAILABLE")
            }
            LlmError::RateLimitExceeded { .. } | LlmError::EmptyResponse { .. } => true,
            LlmError::ProviderError { code, message } => {
                code.contains("UNAVAILABLE") || message.contains("UNAVAILABLE")
            }
            LlmError::StreamError(message) => message.contains("UNAVAILABLE"),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::HttpError {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            body: err.to_string(),
        }
    }
}
