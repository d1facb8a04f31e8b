//! Function registry for tool execution

use std::collections::HashMap;
use std::future::Future;

use async_trait::async_trait;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::declaration::create_tool_declaration;
use super::executor::ToolExecutor;
use crate::llm::core::types::ToolDeclaration;

/// Type alias for boxed async functions
type AsyncToolFn =
    Box<dyn Fn(serde_json::Value) -> BoxFuture<'static, Result<String, String>> + Send + Sync>;

/// Registry of Rust functions the model may call
///
/// Arguments are deserialized from the model's JSON and results serialized
/// back to JSON. Functions registered with [`FunctionRegistry::register_tool`]
/// also record a declaration, so the registry can describe itself to the model.
///
/// ```ignore
/// let mut registry = FunctionRegistry::new();
/// registry.register_tool("web_search", "Search the web", move |args: WebSearchArgs| {
///     let search = search.clone();
///     async move { search.search(&args.query, 5).await.map_err(|e| e.to_string()) }
/// });
/// let declarations = registry.declarations();
/// ```
pub struct FunctionRegistry {
    functions: HashMap<String, AsyncToolFn>,
    declarations: Vec<ToolDeclaration>,
}

impl FunctionRegistry {
    /// Create a new empty function registry
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
            declarations: Vec::new(),
        }
    }

    /// Register an async function together with a schema-derived declaration
    pub fn register_tool<F, Args, R, Fut>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        func: F,
    ) where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Args: DeserializeOwned + JsonSchema + Send + 'static,
        R: Serialize + Send + 'static,
        Fut: Future<Output = Result<R, String>> + Send + 'static,
    {
        let name = name.into();
        self.declarations.retain(|d| d.name != name);
        self.declarations
            .push(create_tool_declaration::<Args>(name.clone(), description));
        self.register_async(name, func);
    }

    /// Register an async function that returns a serializable result
    ///
    /// `name` must match what is declared to the model.
    pub fn register_async<F, Args, R, Fut>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Args: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        Fut: Future<Output = Result<R, String>> + Send + 'static,
    {
        let wrapper = move |args_json: serde_json::Value| {
            let args = match serde_json::from_value::<Args>(args_json) {
                Ok(args) => args,
                Err(e) => {
                    let err_msg = format!("Failed to deserialize arguments: {}", e);
                    return Box::pin(async move { Err(err_msg) }) as BoxFuture<'static, _>;
                }
            };

            let future = func(args);

            Box::pin(async move {
                let result = future.await?;
                serde_json::to_string(&result)
                    .map_err(|e| format!("Failed to serialize result: {}", e))
            }) as BoxFuture<'static, _>
        };

        self.functions.insert(name.into(), Box::new(wrapper));
    }

    /// Register a synchronous function that returns a serializable result
    pub fn register_sync<F, Args, R>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(Args) -> Result<R, String> + Send + Sync + 'static,
        Args: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
    {
        let wrapper = move |args_json: serde_json::Value| {
            let result = serde_json::from_value::<Args>(args_json)
                .map_err(|e| format!("Failed to deserialize arguments: {}", e))
                .and_then(&func)
                .and_then(|value| {
                    serde_json::to_string(&value)
                        .map_err(|e| format!("Failed to serialize result: {}", e))
                });
            Box::pin(async move { result }) as BoxFuture<'static, _>
        };

        self.functions.insert(name.into(), Box::new(wrapper));
    }

    /// Declarations of every tool registered with [`FunctionRegistry::register_tool`]
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.declarations.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    async fn execute_function(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<String, String> {
        match self.functions.get(name) {
            Some(func) => func(arguments).await,
            None => Err(format!("Unknown tool: {}", name)),
        }
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutor for FunctionRegistry {
    async fn execute(
        &self,
        tool_use_id: String,
        name: String,
        arguments: serde_json::Value,
    ) -> Result<String, String> {
        debug!(tool = %name, id = %tool_use_id, "executing tool");
        self.execute_function(&name, arguments).await
    }
}
