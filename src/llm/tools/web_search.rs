//! `web_search` tool backed by a [`SearchProvider`]

use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;

use super::registry::FunctionRegistry;
use crate::search::SearchProvider;

pub const WEB_SEARCH_TOOL: &str = "web_search";

/// Upper bound on results a model may request in one call
const MAX_RESULTS_CAP: usize = 10;

/// Arguments the model passes to `web_search`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WebSearchArgs {
    /// Search query describing the information needed
    pub query: String,
    /// Number of results to return (1-10)
    pub max_results: Option<usize>,
}

/// Register `web_search` on `registry`
///
/// `default_results` applies when the model does not ask for a count.
pub fn register_web_search(
    registry: &mut FunctionRegistry,
    search: Arc<dyn SearchProvider>,
    default_results: usize,
) {
    registry.register_tool(
        WEB_SEARCH_TOOL,
        "Search the web for up-to-date, verifiable information. Returns titles, URLs and content snippets.",
        move |args: WebSearchArgs| {
            let search = search.clone();
            async move {
                let query = args.query.trim().to_string();
                if query.is_empty() {
                    return Err("query must not be empty".to_string());
                }
                let limit = args
                    .max_results
                    .unwrap_or(default_results)
                    .clamp(1, MAX_RESULTS_CAP);
                search
                    .search(&query, limit)
                    .await
                    .map_err(|e| e.to_string())
            }
        },
    );
}

/// Registry containing only the `web_search` tool
pub fn web_search_registry(search: Arc<dyn SearchProvider>, default_results: usize) -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    register_web_search(&mut registry, search, default_results);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::tools::ToolExecutor;
    use crate::search::{SearchError, SearchResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSearch {
        calls: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl SearchProvider for RecordingSearch {
        async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
            self.calls.lock().unwrap().push((query.to_string(), max_results));
            if query == "fail" {
                return Err(SearchError::Http {
                    status: 502,
                    message: "bad gateway".to_string(),
                });
            }
            Ok(vec![SearchResult {
                title: "Result".to_string(),
                url: "https://example.com".to_string(),
                content: format!("about {}", query),
                score: Some(0.5),
            }])
        }
    }

    async fn call(search: Arc<RecordingSearch>, args: serde_json::Value) -> Result<String, String> {
        let registry = web_search_registry(search, 5);
        registry
            .execute("id".to_string(), WEB_SEARCH_TOOL.to_string(), args)
            .await
    }

    #[tokio::test]
    async fn test_uses_default_and_clamps_limit() {
        let search = Arc::new(RecordingSearch::default());
        call(search.clone(), serde_json::json!({"query": " tides "})).await.unwrap();
        call(search.clone(), serde_json::json!({"query": "moon", "max_results": 50}))
            .await
            .unwrap();

        let calls = search.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![("tides".to_string(), 5), ("moon".to_string(), 10)]);
    }

    #[tokio::test]
    async fn test_result_is_json_array() {
        let search = Arc::new(RecordingSearch::default());
        let result = call(search, serde_json::json!({"query": "tides"})).await.unwrap();
        let parsed: Vec<SearchResult> = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed[0].content, "about tides");
    }

    #[tokio::test]
    async fn test_errors_are_reported_to_model() {
        let search = Arc::new(RecordingSearch::default());
        let err = call(search.clone(), serde_json::json!({"query": "fail"}))
            .await
            .unwrap_err();
        assert!(err.contains("bad gateway"));

        let err = call(search, serde_json::json!({"query": "   "})).await.unwrap_err();
        assert_eq!(err, "query must not be empty");
    }

    #[test]
    fn test_declaration_is_registered() {
        let registry = web_search_registry(Arc::new(RecordingSearch::default()), 3);
        let declarations = registry.declarations();
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].name, WEB_SEARCH_TOOL);
        assert!(declarations[0].input_schema["properties"].get("query").is_some());
    }
}
