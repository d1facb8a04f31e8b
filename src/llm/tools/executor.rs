//! Tool executor trait

use async_trait::async_trait;

/// Executes tool calls requested by the model
///
/// The executor receives the call id, function name and JSON arguments and
/// returns either a JSON string result or an error message. Errors are fed
/// back to the model rather than aborting the agent loop.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a tool call
    ///
    /// * `Ok(String)` - Successful execution result (JSON string)
    /// * `Err(String)` - Error message describing what went wrong
    async fn execute(
        &self,
        tool_use_id: String,
        name: String,
        arguments: serde_json::Value,
    ) -> Result<String, String>;
}
