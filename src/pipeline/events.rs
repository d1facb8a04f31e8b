//! Progress events streamed to clients

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use super::ContentResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    StageStarted {
        agent: String,
    },
    AgentText {
        agent: String,
        chunk: String,
    },
    ToolCall {
        agent: String,
        tool_name: String,
        arguments: serde_json::Value,
    },
    ToolResponse {
        agent: String,
        tool_name: String,
        result: serde_json::Value,
    },
    StageCompleted {
        agent: String,
    },
    FallbackActivated {
        reason: String,
    },
    Done {
        result: ContentResult,
    },
    Error {
        message: String,
    },
}

impl PipelineEvent {
    /// Same string as the serde tag
    pub fn name(&self) -> &'static str {
        match self {
            PipelineEvent::StageStarted { .. } => "stage_started",
            PipelineEvent::AgentText { .. } => "agent_text",
            PipelineEvent::ToolCall { .. } => "tool_call",
            PipelineEvent::ToolResponse { .. } => "tool_response",
            PipelineEvent::StageCompleted { .. } => "stage_completed",
            PipelineEvent::FallbackActivated { .. } => "fallback_activated",
            PipelineEvent::Done { .. } => "done",
            PipelineEvent::Error { .. } => "error",
        }
    }
}

/// Optional event channel; sends to a closed or absent channel are dropped
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    sender: Option<UnboundedSender<PipelineEvent>>,
}

impl EventSink {
    pub fn new(sender: Option<UnboundedSender<PipelineEvent>>) -> Self {
        Self { sender }
    }

    pub fn send(&self, event: PipelineEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }

    /// True once the receiving side has gone away; never true without a channel
    pub fn is_closed(&self) -> bool {
        self.sender.as_ref().is_some_and(|sender| sender.is_closed())
    }
}
