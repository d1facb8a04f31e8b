//! Ordered model fallback
//!
//! `ModelCascade` wraps several providers (one per Gemini model) and behaves as
//! a single provider: the first model that answers wins. Models that are
//! overloaded, unknown or rate limited are skipped with a warning. Any other
//! failure is returned immediately.

use async_trait::async_trait;
use tracing::warn;

use crate::llm::core::{
    error::LlmError,
    provider::{EventStream, LlmProvider},
    types::{Generation, GenerateRequest},
};

/// Characters of the prompt echoed back by [`offline_notice`]
const PROMPT_PREVIEW_CHARS: usize = 120;

/// Provider that tries its inner providers in order
pub struct ModelCascade {
    providers: Vec<Box<dyn LlmProvider>>,
}

impl ModelCascade {
    pub fn new(providers: Vec<Box<dyn LlmProvider>>) -> Self {
        Self { providers }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn skip(provider: &dyn LlmProvider, error: &LlmError, attempted: &mut Vec<String>) {
        let model = provider.model_name();
        warn!(model = %model, error = %error, "model unavailable, trying next");
        attempted.push(model);
    }
}

#[async_trait]
impl LlmProvider for ModelCascade {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        let mut attempted = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            match provider.stream_generate(request.clone()).await {
                Ok(stream) => return Ok(stream),
                Err(e) if e.is_retryable_model_failure() => {
                    Self::skip(provider.as_ref(), &e, &mut attempted)
                }
                Err(e) => return Err(e),
            }
        }

        Err(LlmError::AllModelsUnavailable { attempted })
    }

    fn model_name(&self) -> String {
        self.providers
            .iter()
            .map(|p| p.model_name())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Unlike the streaming path, this also moves on when a model fails
    /// mid-stream or answers with nothing.
    async fn generate_text(&self, request: GenerateRequest) -> Result<Generation, LlmError> {
        let mut attempted = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            match provider.generate_text(request.clone()).await {
                Ok(generation) => return Ok(generation),
                Err(e) if e.is_retryable_model_failure() => {
                    Self::skip(provider.as_ref(), &e, &mut attempted)
                }
                Err(e) => return Err(e),
            }
        }

        Err(LlmError::AllModelsUnavailable { attempted })
    }
}

/// Placeholder content returned when every model is unavailable
pub fn offline_notice(prompt: &str) -> String {
    let preview: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
    format!(
        "⚠ **Gemini servers are busy. Fallback activated.**\n\n\
         Prompt preview: {}...\n\n\
         - Please try again after a few seconds.\n\
         - This is offline fallback content.",
        preview
    )
}
