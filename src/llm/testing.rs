//! Scripted provider shared by unit tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::llm::core::{
    error::LlmError,
    provider::{EventStream, LlmProvider},
    types::{
        ContentBlockStart, ContentDelta, FinishReason, GenerateRequest, PartialToolUse,
        StreamEvent, UsageMetadata,
    },
};

/// Replays one scripted turn per call and records every request
pub struct ScriptedProvider {
    turns: Mutex<VecDeque<Result<Vec<StreamEvent>, LlmError>>>,
    pub requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedProvider {
    pub fn new(turns: Vec<Vec<StreamEvent>>) -> Arc<Self> {
        Self::with_results(turns.into_iter().map(Ok).collect())
    }

    pub fn with_results(turns: Vec<Result<Vec<StreamEvent>, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            turns: Mutex::new(turns.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        self.requests.lock().unwrap().push(request);
        let events = self
            .turns
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::StreamError("No more responses".to_string())))?;
        Ok(Box::pin(futures::stream::iter(events.into_iter().map(Ok))))
    }

    fn model_name(&self) -> String {
        "scripted".to_string()
    }
}

pub fn text_turn(text: &str) -> Vec<StreamEvent> {
    vec![
        StreamEvent::ContentDelta {
            index: 0,
            delta: ContentDelta::TextDelta {
                text: text.to_string(),
            },
        },
        StreamEvent::MessageEnd {
            finish_reason: FinishReason::Stop,
            usage: UsageMetadata::new(1, 1),
        },
    ]
}

pub fn tool_turn(name: &str, args: serde_json::Value) -> Vec<StreamEvent> {
    vec![
        StreamEvent::ContentBlockStart {
            index: 0,
            block: ContentBlockStart::ToolUse {
                id: "call-1".to_string(),
                name: name.to_string(),
            },
        },
        StreamEvent::ContentDelta {
            index: 0,
            delta: ContentDelta::ToolUseDelta {
                partial: PartialToolUse {
                    id: None,
                    name: Some(name.to_string()),
                    partial_json: args.to_string(),
                },
            },
        },
        StreamEvent::ContentBlockEnd { index: 0 },
        StreamEvent::MessageEnd {
            finish_reason: FinishReason::ToolUse,
            usage: UsageMetadata::new(1, 1),
        },
    ]
}
