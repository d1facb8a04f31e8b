//! Tool execution framework
//!
//! The `ToolExecutor` trait is what the agent loop calls; `FunctionRegistry`
//! implements it for plain Rust functions. `web_search` is the one tool the
//! research agent is given.

pub mod declaration;
pub mod executor;
pub mod registry;
pub mod web_search;

pub use declaration::create_tool_declaration;
pub use executor::ToolExecutor;
pub use registry::FunctionRegistry;
pub use web_search::{register_web_search, web_search_registry, WebSearchArgs, WEB_SEARCH_TOOL};
