//! Gemini client implementation

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::llm::core::{
    error::LlmError,
    provider::{EventStream, LlmProvider},
    types::GenerateRequest,
};

use super::mapper::{create_message_start, from_gemini_response, to_gemini_request};
use super::sse::parse_sse_stream;

/// Public Gemini Developer API endpoint (API-key authenticated)
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Longest silence tolerated between streamed chunks
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Gemini model identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 2.5 Flash
    Gemini25Flash,
    /// Gemini 2.5 Pro
    Gemini25Pro,
    /// Gemini 2.0 Pro
    Gemini20Pro,
    /// Gemini 2.0 Flash
    Gemini20Flash,
    /// Any other model id accepted by the API
    Custom(String),
}

impl GeminiModel {
    /// Get the model identifier string
    pub fn as_str(&self) -> &str {
        match self {
            GeminiModel::Gemini25Flash => "gemini-2.5-flash",
            GeminiModel::Gemini25Pro => "gemini-2.5-pro",
            GeminiModel::Gemini20Pro => "gemini-2.0-pro",
            GeminiModel::Gemini20Flash => "gemini-2.0-flash",
            GeminiModel::Custom(id) => id,
        }
    }

    /// Main model followed by its fallbacks
    pub fn default_cascade() -> Vec<GeminiModel> {
        vec![
            GeminiModel::Gemini25Flash,
            GeminiModel::Gemini20Pro,
            GeminiModel::Gemini20Flash,
        ]
    }
}

impl fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeminiModel {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().trim_start_matches("models/");
        match id {
            "" => Err(LlmError::InvalidRequest("empty model id".to_string())),
            "gemini-2.5-flash" => Ok(GeminiModel::Gemini25Flash),
            "gemini-2.5-pro" => Ok(GeminiModel::Gemini25Pro),
            "gemini-2.0-pro" => Ok(GeminiModel::Gemini20Pro),
            "gemini-2.0-flash" => Ok(GeminiModel::Gemini20Flash),
            other => Ok(GeminiModel::Custom(other.to_string())),
        }
    }
}

/// Client for one Gemini model on the Developer API
pub struct GeminiClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Value for the `x-goog-api-key` header
    api_key: String,
    /// API root, overridable for proxies and tests
    base_url: String,
    /// Model to use
    model: GeminiModel,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank or the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, model: GeminiModel) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::AuthenticationError(
                "GEMINI_API_KEY is empty".to_string(),
            ));
        }

        Ok(Self {
            http_client: http_client(DEFAULT_READ_TIMEOUT)?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
        })
    }

    /// Replace the read timeout applied while waiting for stream data
    pub fn with_read_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.http_client = http_client(timeout)?;
        Ok(self)
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The model this client talks to
    pub fn model(&self) -> &GeminiModel {
        &self.model
    }

    /// Build the endpoint URL for streaming
    fn build_endpoint_url(&self) -> String {
        build_endpoint_url(&self.base_url, &self.model)
    }

    /// Make a streaming request to Gemini
    async fn make_streaming_request(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        let gemini_request = to_gemini_request(request);

        let url = self.build_endpoint_url();
        debug!(model = %self.model, "calling Gemini");
        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let byte_stream = response.bytes_stream();
        let sse_stream = parse_sse_stream(Box::pin(byte_stream));

        let message_id = Uuid::new_v4().to_string();
        let mut emitted_start = false;
        let mut current_index = 0;

        let event_stream = sse_stream.map(move |result| match result {
            Ok(gemini_response) => {
                let mut events = Vec::new();

                if !emitted_start {
                    events.push(create_message_start(message_id.clone()));
                    emitted_start = true;
                }

                events.append(&mut from_gemini_response(gemini_response, &mut current_index));
                Ok(events)
            }
            Err(e) => Err(e),
        });

        let flattened = event_stream.flat_map(|result| {
            futures::stream::iter(match result {
                Ok(events) => events.into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(e)],
            })
        });

        Ok(Box::pin(flattened))
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        self.make_streaming_request(request).await
    }

    fn model_name(&self) -> String {
        self.model.to_string()
    }
}

fn build_endpoint_url(base_url: &str, model: &GeminiModel) -> String {
    format!(
        "{}/models/{}:streamGenerateContent?alt=sse",
        base_url,
        model.as_str()
    )
}

fn http_client(read_timeout: Duration) -> Result<Client, LlmError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .read_timeout(read_timeout)
        .build()
        .map_err(|e| LlmError::HttpError {
            status: 0,
            body: format!("Failed to create HTTP client: {}", e),
        })
}

/// Translate a non-success status into the matching error
fn status_error(status: StatusCode, body: String) -> LlmError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded { retry_after: None },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::AuthenticationError(body),
        _ => LlmError::HttpError {
            status: status.as_u16(),
            body,
        },
    }
}
