// Configuration and logging
pub mod config;
pub mod logging;

// HTTP Server modules
pub mod handlers;
pub mod models;
pub mod routes;
pub mod sse;

// LLM layer, web search and the agent crew
pub mod crew;
pub mod llm;
pub mod pipeline;
pub mod search;

pub use config::{AppConfig, ConfigError};
pub use models::AppState;
pub use pipeline::{ContentPipeline, ContentRequest, ContentResult, PipelineError, PipelineEvent};
pub use routes::configure_routes;
