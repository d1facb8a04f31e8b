//! LLM layer
//!
//! Provider-neutral types, the Gemini Developer API client, the model cascade
//! that hides overloaded models, tool plumbing and the agent loop.

pub mod agent;
pub mod cascade;
pub mod core;
pub mod gemini;
pub mod tools;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use agent::{Agent, AgentError, AgentEvent};
pub use cascade::{offline_notice, ModelCascade};
pub use core::{
    config::GenerationConfig,
    error::LlmError,
    provider::{create_provider, LlmProvider},
    types::{
        ContentBlock, ContentDelta, FinishReason, GenerateRequest, Generation, Message,
        MessageRole, StreamEvent, ToolDeclaration, UsageMetadata,
    },
};
pub use gemini::GeminiModel;
pub use tools::{FunctionRegistry, ToolExecutor};
