//! Provider trait for LLM implementations

use async_trait::async_trait;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;
use std::sync::Arc;

use super::{
    error::LlmError,
    types::{ContentDelta, Generation, GenerateRequest, StreamEvent, UsageMetadata},
};
use crate::llm::cascade::ModelCascade;
use crate::llm::gemini::{GeminiClient, GeminiModel};

/// Boxed stream of provider events
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send>>;

/// Main interface that all LLM provider implementations must satisfy
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Stream generate content from the LLM
    ///
    /// This method sends a request to the LLM and returns a stream of events
    /// representing the incremental response.
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError>;

    /// Identifier of the model (or model chain) behind this provider
    fn model_name(&self) -> String;

    /// Drain a streamed generation into plain text
    ///
    /// Tool calls are ignored. An answer without any text is reported as
    /// [`LlmError::EmptyResponse`].
    async fn generate_text(&self, request: GenerateRequest) -> Result<Generation, LlmError> {
        let stream = self.stream_generate(request).await?;
        collect_text(self.model_name(), stream).await
    }
}

/// Concatenate the text deltas of an event stream
pub async fn collect_text(model: String, mut stream: EventStream) -> Result<Generation, LlmError> {
    let mut text = String::new();
    let mut finish_reason = None;
    let mut usage = UsageMetadata::default();

    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::ContentDelta {
                delta: ContentDelta::TextDelta { text: chunk },
                ..
            } => text.push_str(&chunk),
            StreamEvent::MessageEnd {
                finish_reason: reason,
                usage: end_usage,
            } => {
                finish_reason = Some(reason);
                usage.add(&end_usage);
            }
            StreamEvent::Error { error } => return Err(LlmError::StreamError(error)),
            _ => {}
        }
    }

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse { model });
    }

    Ok(Generation {
        model,
        text,
        finish_reason,
        usage,
    })
}

/// Create the Gemini model cascade used by every agent
///
/// Each model gets its own client; the cascade tries them in order.
///
/// # Example
///
/// ```rust,no_run
/// use content_crew::llm::{create_provider, GeminiModel};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = create_provider(
///     "my-api-key",
///     &[GeminiModel::Gemini25Flash, GeminiModel::Gemini20Flash],
///     None,
/// )?;
/// # Ok(())
/// # }
/// ```
pub fn create_provider(
    api_key: &str,
    models: &[GeminiModel],
    base_url: Option<&str>,
) -> Result<Arc<dyn LlmProvider>, LlmError> {
    if models.is_empty() {
        return Err(LlmError::InvalidRequest(
            "at least one Gemini model is required".to_string(),
        ));
    }

    let mut providers: Vec<Box<dyn LlmProvider>> = Vec::with_capacity(models.len());
    for model in models {
        let mut client = GeminiClient::new(api_key, model.clone())?;
        if let Some(base_url) = base_url {
            client = client.with_base_url(base_url);
        }
        providers.push(Box::new(client));
    }

    Ok(Arc::new(ModelCascade::new(providers)))
}
