use crate::llm::core::error::LlmError;

/// Errors that can occur during agent execution
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Error from the LLM provider
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Failed to parse tool input JSON
    #[error("Failed to parse tool input: {0}")]
    ToolInputParse(#[from] serde_json::Error),

    /// Maximum iterations reached without completion
    #[error("Maximum iterations reached ({0})")]
    MaxIterationsReached(usize),

    /// The loop finished but the last turn carried no text
    #[error("Agent finished without a text answer")]
    EmptyAnswer,
}

impl AgentError {
    /// The underlying LLM error, if any
    pub fn as_llm(&self) -> Option<&LlmError> {
        match self {
            AgentError::Llm(e) => Some(e),
            _ => None,
        }
    }
}
