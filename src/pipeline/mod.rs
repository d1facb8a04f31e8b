//! Content pipeline
//!
//! `ContentPipeline::create_content` runs the crew and, if the crew fails for
//! any reason, the single-pass fallback. Progress goes to an optional
//! [`EventSink`] so the server can stream it. Once that sink's receiver is
//! dropped, no further stage is started.

pub mod events;
pub mod fallback;
pub mod keywords;
mod request;

pub use events::{EventSink, PipelineEvent};
pub use fallback::{Fallback, FallbackOutput, GEMINI_ERROR_PREFIX};
pub use keywords::extract_keywords;
pub use request::{ContentRequest, DEFAULT_CONTENT_TYPE, DEFAULT_LENGTH, DEFAULT_TONE};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::crew::{content_tasks, Crew, CrewError, CrewEvent, CrewSettings};
use crate::llm::agent::AgentEvent;
use crate::llm::core::{
    config::GenerationConfig,
    error::LlmError,
    provider::{create_provider, LlmProvider},
    types::{ContentDelta, StreamEvent},
};
use crate::search::{SearchError, SearchProvider, TavilyClient};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Content generation failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Search setup failed: {0}")]
    Search(#[from] SearchError),

    #[error("Generation stopped: the client disconnected")]
    Cancelled,
}

/// One named step of the pipeline and what it produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutput {
    pub agent: String,
    pub output: String,
}

impl StageOutput {
    pub fn new(agent: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            output: output.into(),
        }
    }
}

/// `success` is false when the fallback produced the content; `error` then
/// holds the crew failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub final_output: String,
    pub pipeline: Vec<StageOutput>,
}

pub struct ContentPipeline {
    provider: Arc<dyn LlmProvider>,
    search: Option<Arc<dyn SearchProvider>>,
    settings: CrewSettings,
}

impl ContentPipeline {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        search: Option<Arc<dyn SearchProvider>>,
        settings: CrewSettings,
    ) -> Self {
        Self {
            provider,
            search,
            settings,
        }
    }

    /// Gemini cascade plus Tavily (when a key is configured)
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let provider = create_provider(&config.gemini_api_key, &config.models, None)?;

        let search: Option<Arc<dyn SearchProvider>> = match &config.tavily_api_key {
            Some(key) => Some(Arc::new(TavilyClient::new(key.as_str())?)),
            None => None,
        };

        let settings = CrewSettings {
            generation: GenerationConfig::new(config.max_tokens)
                .with_optional_temperature(config.temperature),
            max_iterations: config.max_iterations,
            search_results: config.search_results,
        };

        Ok(Self::new(provider, search, settings))
    }

    pub fn research_available(&self) -> bool {
        self.search.is_some()
    }

    pub fn model_name(&self) -> String {
        self.provider.model_name()
    }

    /// Generate content for `request`
    ///
    /// Ends the event stream with `done` on success or `error` on failure.
    pub async fn create_content(
        &self,
        request: ContentRequest,
        events: Option<UnboundedSender<PipelineEvent>>,
    ) -> Result<ContentResult, PipelineError> {
        let events = EventSink::new(events);

        match self.generate(&request, &events).await {
            Ok(result) => {
                events.send(PipelineEvent::Done {
                    result: result.clone(),
                });
                Ok(result)
            }
            Err(e) => {
                events.send(PipelineEvent::Error {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn generate(
        &self,
        request: &ContentRequest,
        events: &EventSink,
    ) -> Result<ContentResult, PipelineError> {
        request.validate()?;

        let search = self.search.as_ref().filter(|_| request.use_research);
        info!(
            topic = %request.topic,
            content_type = %request.content_type,
            research = search.is_some(),
            "creating content"
        );

        let mut crew = Crew::new(self.provider.clone(), search.cloned(), self.settings.clone());
        for task in content_tasks(request, search.is_some()) {
            crew.add_task(task);
        }
        let sink = events.clone();
        crew.stop_when(move || sink.is_closed());

        let crew_error = match crew.kickoff(|event| forward_crew_event(events, event)).await {
            Ok(output) => {
                info!(tasks = output.tasks_output.len(), "crew finished");
                return Ok(ContentResult {
                    success: true,
                    error: None,
                    final_output: output.final_output,
                    pipeline: output
                        .tasks_output
                        .into_iter()
                        .map(|t| StageOutput::new(t.agent, t.output))
                        .collect(),
                });
            }
            Err(CrewError::Stopped { agent }) => {
                info!(agent = %agent, "event receiver gone, stopping crew");
                return Err(PipelineError::Cancelled);
            }
            Err(e) => e,
        };

        warn!(error = %crew_error, "crew failed, falling back");
        events.send(PipelineEvent::FallbackActivated {
            reason: crew_error.to_string(),
        });

        let fallback = Fallback {
            provider: self.provider.as_ref(),
            search: search.map(|s| s.as_ref()),
            search_results: self.settings.search_results,
            generation: &self.settings.generation,
        };
        let output = fallback.run(request, events).await?;

        Ok(ContentResult {
            success: false,
            error: Some(crew_error.to_string()),
            final_output: output.final_output,
            pipeline: output.stages,
        })
    }
}

fn forward_crew_event(events: &EventSink, event: CrewEvent) {
    let event = match event {
        CrewEvent::TaskStarted { agent, .. } => PipelineEvent::StageStarted { agent },
        CrewEvent::TaskCompleted { agent } => PipelineEvent::StageCompleted { agent },
        CrewEvent::Agent { agent, event } => match event {
            AgentEvent::LlmEvent(StreamEvent::ContentDelta {
                delta: ContentDelta::TextDelta { text },
                ..
            }) => PipelineEvent::AgentText { agent, chunk: text },
            AgentEvent::ToolExecutionStarted { name, input, .. } => PipelineEvent::ToolCall {
                agent,
                tool_name: name,
                arguments: input,
            },
            AgentEvent::ToolExecutionCompleted { name, result, .. } => {
                PipelineEvent::ToolResponse {
                    agent,
                    tool_name: name,
                    result: serde_json::from_str(&result)
                        .unwrap_or(serde_json::Value::String(result)),
                }
            }
            AgentEvent::ToolExecutionFailed { name, error, .. } => PipelineEvent::ToolResponse {
                agent,
                tool_name: name,
                result: serde_json::json!({ "error": error }),
            },
            _ => return,
        },
    };
    events.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GEMINI_API_KEY;
    use crate::llm::core::{provider::EventStream, types::GenerateRequest};
    use crate::llm::testing::{text_turn, ScriptedProvider};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn pipeline(provider: Arc<ScriptedProvider>) -> ContentPipeline {
        ContentPipeline::new(provider, None, CrewSettings::default())
    }

    #[tokio::test]
    async fn test_crew_success() {
        let provider = ScriptedProvider::new(vec![
            text_turn("draft"),
            text_turn("edited"),
            text_turn("seo notes"),
        ]);
        let result = pipeline(provider)
            .create_content(ContentRequest::new("Tides"), None)
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.error, None);
        assert_eq!(result.final_output, "seo notes");
        assert_eq!(result.pipeline.len(), 3);
        assert_eq!(result.pipeline[0], StageOutput::new("Writer Agent", "draft"));
    }

    #[tokio::test]
    async fn test_invalid_request_emits_error() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let err = pipeline(ScriptedProvider::new(vec![]))
            .create_content(ContentRequest::new(" "), Some(tx))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::InvalidRequest(_)));
        assert!(matches!(rx.recv().await, Some(PipelineEvent::Error { .. })));
    }

    #[tokio::test]
    async fn test_crew_failure_runs_fallback() {
        let provider = ScriptedProvider::with_results(vec![
            Ok(text_turn("draft")),
            Err(LlmError::HttpError {
                status: 500,
                body: "internal".to_string(),
            }),
            Ok(text_turn("fallback draft")),
            Ok(text_turn("fallback polished text")),
        ]);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let result = pipeline(provider)
            .create_content(ContentRequest::new("Tides"), Some(tx))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("Editor Agent"));
        assert_eq!(result.final_output, "fallback polished text");
        assert_eq!(result.pipeline[0], StageOutput::new("ResearchAgent", "No research available"));
        assert_eq!(result.pipeline[3].output, "fallback, polished, text");

        let mut saw_fallback = false;
        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, PipelineEvent::FallbackActivated { .. }) {
                saw_fallback = true;
            }
            last = Some(event);
        }
        assert!(saw_fallback);
        assert!(matches!(last, Some(PipelineEvent::Done { .. })));
    }

    #[tokio::test]
    async fn test_agent_text_is_forwarded() {
        let provider = ScriptedProvider::new(vec![text_turn("a"), text_turn("b"), text_turn("c")]);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        pipeline(provider)
            .create_content(ContentRequest::new("Tides"), Some(tx))
            .await
            .unwrap();

        let mut chunks = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let PipelineEvent::AgentText { agent, chunk } = event {
                chunks.push(format!("{}:{}", agent, chunk));
            }
        }
        assert_eq!(
            chunks,
            vec!["Writer Agent:a", "Editor Agent:b", "SEO Agent:c"]
        );
    }

    #[tokio::test]
    async fn test_dropped_receiver_stops_all_calls() {
        let provider = ScriptedProvider::new(vec![text_turn("a"), text_turn("b"), text_turn("c")]);
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);

        let err = pipeline(provider.clone())
            .create_content(ContentRequest::new("Tides"), Some(tx))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled));
        assert_eq!(provider.request_count(), 0);
    }

    /// Drops the event receiver while serving its first call
    struct DisconnectingProvider {
        inner: Arc<ScriptedProvider>,
        receiver: Mutex<Option<UnboundedReceiver<PipelineEvent>>>,
    }

    #[async_trait]
    impl LlmProvider for DisconnectingProvider {
        async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
            drop(self.receiver.lock().unwrap().take());
            self.inner.stream_generate(request).await
        }

        fn model_name(&self) -> String {
            self.inner.model_name()
        }
    }

    #[tokio::test]
    async fn test_receiver_dropped_mid_crew() {
        let scripted = ScriptedProvider::new(vec![text_turn("a"), text_turn("b"), text_turn("c")]);
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let provider = Arc::new(DisconnectingProvider {
            inner: scripted.clone(),
            receiver: Mutex::new(Some(rx)),
        });

        let result = ContentPipeline::new(provider, None, CrewSettings::default())
            .create_content(ContentRequest::new("Tides"), Some(tx))
            .await;

        assert!(matches!(result, Err(PipelineError::Cancelled)));
        assert_eq!(scripted.request_count(), 1);
    }

    #[test]
    fn test_result_serialization_omits_missing_error() {
        let result = ContentResult {
            success: true,
            error: None,
            final_output: "text".to_string(),
            pipeline: vec![StageOutput::new("SEO Agent", "k")],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("error").is_none());
        assert_eq!(value["pipeline"][0]["agent"], "SEO Agent");
    }

    #[test]
    fn test_from_config() {
        let config = AppConfig::from_lookup(|key| match key {
            GEMINI_API_KEY => Some("g-key".to_string()),
            "CONTENT_CREW_MODELS" => Some("gemini-2.0-flash".to_string()),
            _ => None,
        })
        .unwrap();
        let pipeline = ContentPipeline::from_config(&config).unwrap();
        assert!(!pipeline.research_available());
        assert_eq!(pipeline.model_name(), "gemini-2.0-flash");
    }
}
