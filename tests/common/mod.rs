//! Mock LLM and search backends for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use content_crew::llm::core::provider::EventStream;
use content_crew::llm::core::types::{ContentBlockStart, PartialToolUse};
use content_crew::llm::{
    ContentDelta, FinishReason, GenerateRequest, LlmError, LlmProvider, StreamEvent, UsageMetadata,
};
use content_crew::search::{SearchError, SearchProvider, SearchResult};

/// One scripted LLM turn
pub enum Turn {
    Text(String),
    ToolCall(String, serde_json::Value),
    Fail(LlmError),
}

impl Turn {
    pub fn text(text: &str) -> Self {
        Turn::Text(text.to_string())
    }

    pub fn unavailable() -> Self {
        Turn::Fail(LlmError::AllModelsUnavailable {
            attempted: vec!["gemini-2.5-flash".to_string(), "gemini-2.0-flash".to_string()],
        })
    }
}

/// Replays turns in order and records each request
pub struct ScriptedProvider {
    turns: Mutex<VecDeque<Turn>>,
    pub requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedProvider {
    pub fn new(turns: Vec<Turn>) -> Arc<Self> {
        Arc::new(Self {
            turns: Mutex::new(turns.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.first_user_text())
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.turns.lock().unwrap().len()
    }
}

fn end(finish_reason: FinishReason) -> StreamEvent {
    StreamEvent::MessageEnd {
        finish_reason,
        usage: UsageMetadata::new(10, 20),
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        self.requests.lock().unwrap().push(request);
        let turn = self
            .turns
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Turn::Fail(LlmError::StreamError("script exhausted".to_string())));

        let events = match turn {
            Turn::Text(text) => vec![
                StreamEvent::ContentDelta {
                    index: 0,
                    delta: ContentDelta::TextDelta { text },
                },
                end(FinishReason::Stop),
            ],
            Turn::ToolCall(name, args) => vec![
                StreamEvent::ContentBlockStart {
                    index: 0,
                    block: ContentBlockStart::ToolUse {
                        id: "toolu_1".to_string(),
                        name: name.clone(),
                    },
                },
                StreamEvent::ContentDelta {
                    index: 0,
                    delta: ContentDelta::ToolUseDelta {
                        partial: PartialToolUse {
                            id: None,
                            name: Some(name),
                            partial_json: args.to_string(),
                        },
                    },
                },
                StreamEvent::ContentBlockEnd { index: 0 },
                end(FinishReason::ToolUse),
            ],
            Turn::Fail(e) => return Err(e),
        };

        Ok(Box::pin(futures::stream::iter(events.into_iter().map(Ok))))
    }

    fn model_name(&self) -> String {
        "scripted".to_string()
    }
}

/// Always returns the same hits and counts queries
pub struct StaticSearch {
    results: Vec<SearchResult>,
    pub queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn new(results: Vec<SearchResult>) -> Arc<Self> {
        Arc::new(Self {
            results,
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn with_hit(title: &str, content: &str) -> Arc<Self> {
        Self::new(vec![SearchResult {
            title: title.to_string(),
            url: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
            content: content.to_string(),
            score: Some(0.9),
        }])
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.results.iter().take(max_results).cloned().collect())
    }
}
