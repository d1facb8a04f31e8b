//! Agent loop
//!
//! An agent:
//! - Maintains conversation history
//! - Calls the LLM and streams all responses
//! - Automatically executes tool calls
//! - Loops until getting a text-only response
//! - Returns a stream of events throughout the entire loop

mod error;

pub use error::AgentError;

use crate::llm::core::{
    config::GenerationConfig,
    provider::LlmProvider,
    types::{
        ContentBlock, ContentBlockStart, ContentDelta, GenerateRequest, Message, MessageRole,
        StreamEvent, ToolDeclaration,
    },
};
use crate::config::DEFAULT_MAX_ITERATIONS;
use crate::llm::tools::executor::ToolExecutor;
use async_stream::stream;
use futures::stream::Stream;
use futures::StreamExt;
use pin_utils::pin_mut;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

/// Events emitted by the agent during execution
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// Raw LLM streaming event (text deltas, tool calls, etc.)
    LlmEvent(StreamEvent),

    /// Agent is executing a tool call
    ToolExecutionStarted {
        tool_use_id: String,
        name: String,
        input: serde_json::Value,
    },

    /// Tool execution completed successfully
    ToolExecutionCompleted {
        tool_use_id: String,
        name: String,
        result: String,
    },

    /// Tool execution failed with an error
    ToolExecutionFailed {
        tool_use_id: String,
        name: String,
        error: String,
    },

    /// Agent is starting a new iteration (calling LLM again after tool execution)
    IterationStarted { iteration: usize },

    /// Agent loop completed (final response with no tool calls)
    Completed,
}

/// Helper struct for accumulating partial tool use data
struct PartialToolUseAccumulator {
    id: String,
    name: String,
    input: String,
}

/// Agent that manages conversation history and tool execution
pub struct Agent {
    /// Shared LLM provider (usually the model cascade)
    provider: Arc<dyn LlmProvider>,

    /// Tool executor and the declarations advertised to the model
    tools: Option<(Box<dyn ToolExecutor>, Vec<ToolDeclaration>)>,

    /// Conversation history (kept in memory)
    messages: Vec<Message>,

    config: GenerationConfig,

    system: Option<String>,

    max_iterations: usize,
}

impl Agent {
    /// Create a tool-less agent
    pub fn new(provider: Arc<dyn LlmProvider>, config: GenerationConfig) -> Self {
        Self {
            provider,
            tools: None,
            messages: Vec::new(),
            config,
            system: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set the system prompt
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Give the agent tools it may call
    pub fn with_tools(
        mut self,
        executor: Box<dyn ToolExecutor>,
        declarations: Vec<ToolDeclaration>,
    ) -> Self {
        self.tools = Some((executor, declarations));
        self
    }

    /// Set the maximum number of iterations (default: 10)
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Process a new user message through the agent loop
    ///
    /// The returned stream will emit:
    /// - IterationStarted events when calling the LLM
    /// - LlmEvent events for all streaming responses from the LLM
    /// - ToolExecution* events when executing tools
    /// - Completed event when the agent loop finishes
    pub async fn run(
        &mut self,
        user_message: impl Into<String>,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<AgentEvent, AgentError>> + Send + '_>>, AgentError>
    {
        self.messages.push(Message::user(user_message));

        let stream = self.create_agent_stream();

        Ok(Box::pin(stream))
    }

    /// Run the loop to completion and return the final answer text
    ///
    /// Every event is passed to `on_event` as it happens.
    pub async fn run_to_text<F>(
        &mut self,
        user_message: impl Into<String>,
        mut on_event: F,
    ) -> Result<String, AgentError>
    where
        F: FnMut(&AgentEvent) + Send,
    {
        {
            let mut stream = self.run(user_message).await?;
            while let Some(event) = stream.next().await {
                on_event(&event?);
            }
        }

        let answer = self
            .messages
            .last()
            .filter(|m| m.role == MessageRole::Assistant)
            .map(Message::text)
            .unwrap_or_default();

        if answer.trim().is_empty() {
            return Err(AgentError::EmptyAnswer);
        }
        Ok(answer)
    }

    /// Get the full conversation history
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Create the agent event stream
    fn create_agent_stream(&mut self) -> impl Stream<Item = Result<AgentEvent, AgentError>> + Send + '_ {
        stream! {
            let mut iteration = 0;

            loop {
                iteration += 1;

                if iteration > self.max_iterations {
                    yield Err(AgentError::MaxIterationsReached(iteration - 1));
                    return;
                }

                yield Ok(AgentEvent::IterationStarted { iteration });
                debug!(iteration, model = %self.provider.model_name(), "agent iteration");

                let request = GenerateRequest {
                    messages: self.messages.clone(),
                    tools: self.tools.as_ref().map(|(_, declarations)| declarations.clone()),
                    config: self.config.clone(),
                    system: self.system.clone(),
                };

                let llm_stream = match self.provider.stream_generate(request).await {
                    Ok(s) => s,
                    Err(e) => {
                        yield Err(AgentError::Llm(e));
                        return;
                    }
                };

                // Forward events while accumulating text and tool calls
                let mut text_content = String::new();
                let mut tool_uses = Vec::new();
                let mut current_tool_use: Option<PartialToolUseAccumulator> = None;

                pin_mut!(llm_stream);

                while let Some(event_result) = llm_stream.next().await {
                    let event = match event_result {
                        Ok(e) => e,
                        Err(e) => {
                            yield Err(AgentError::Llm(e));
                            return;
                        }
                    };

                    yield Ok(AgentEvent::LlmEvent(event.clone()));

                    match &event {
                        StreamEvent::ContentBlockStart { block, .. } => match block {
                            ContentBlockStart::Text { text } => text_content.push_str(text),
                            ContentBlockStart::ToolUse { id, name } => {
                                current_tool_use = Some(PartialToolUseAccumulator {
                                    id: id.clone(),
                                    name: name.clone(),
                                    input: String::new(),
                                });
                            }
                        },
                        StreamEvent::ContentDelta { delta, .. } => match delta {
                            ContentDelta::TextDelta { text } => text_content.push_str(text),
                            ContentDelta::ToolUseDelta { partial } => {
                                if let Some(tool_use) = &mut current_tool_use {
                                    tool_use.input.push_str(&partial.partial_json);
                                }
                            }
                        },
                        StreamEvent::ContentBlockEnd { .. } => {
                            if let Some(tool_use) = current_tool_use.take() {
                                match serde_json::from_str(&tool_use.input) {
                                    Ok(input) => {
                                        tool_uses.push(ContentBlock::ToolUse {
                                            id: tool_use.id,
                                            name: tool_use.name,
                                            input,
                                        });
                                    }
                                    Err(e) => {
                                        yield Err(AgentError::ToolInputParse(e));
                                        return;
                                    }
                                }
                            }
                        }
                        StreamEvent::MessageEnd { .. } => break,
                        _ => {}
                    }
                }

                let mut assistant_content = Vec::new();
                if !text_content.is_empty() {
                    assistant_content.push(ContentBlock::Text { text: text_content });
                }

                if tool_uses.is_empty() {
                    self.messages.push(Message {
                        role: MessageRole::Assistant,
                        content: assistant_content,
                    });

                    yield Ok(AgentEvent::Completed);
                    return;
                }

                assistant_content.extend(tool_uses.clone());
                self.messages.push(Message {
                    role: MessageRole::Assistant,
                    content: assistant_content,
                });

                for block in &tool_uses {
                    if let ContentBlock::ToolUse { id, name, input } = block {
                        yield Ok(AgentEvent::ToolExecutionStarted {
                            tool_use_id: id.clone(),
                            name: name.clone(),
                            input: input.clone(),
                        });

                        let outcome = match &self.tools {
                            Some((executor, _)) => {
                                executor.execute(id.clone(), name.clone(), input.clone()).await
                            }
                            None => Err(format!("No tools available (requested {})", name)),
                        };

                        match outcome {
                            Ok(result) => {
                                yield Ok(AgentEvent::ToolExecutionCompleted {
                                    tool_use_id: id.clone(),
                                    name: name.clone(),
                                    result: result.clone(),
                                });
                                self.messages.push(Message::tool_result(id.clone(), result));
                            }
                            Err(error) => {
                                yield Ok(AgentEvent::ToolExecutionFailed {
                                    tool_use_id: id.clone(),
                                    name: name.clone(),
                                    error: error.clone(),
                                });
                                self.messages.push(Message::tool_error(id.clone(), error));
                            }
                        }
                    }
                }

                // Next iteration hands the tool results back to the LLM
            }
        }
    }
}
