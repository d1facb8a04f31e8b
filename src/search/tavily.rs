//! Tavily search API client

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{SearchError, SearchProvider, SearchResult};

pub const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct SearchBody<'a> {
    query: &'a str,
    max_results: usize,
    include_answer: bool,
    include_raw_content: bool,
}

/// Client for `POST https://api.tavily.com/search`
pub struct TavilyClient {
    http_client: Client,
    api_key: String,
    endpoint: String,
}

impl TavilyClient {
    /// Create a client from an API key
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::NotConfigured`] for a blank key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, SearchError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(SearchError::NotConfigured(
                "TAVILY_API_KEY is empty".to_string(),
            ));
        }

        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SearchError::Http {
                status: 0,
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            api_key,
            endpoint: TAVILY_SEARCH_URL.to_string(),
        })
    }

    /// Send requests somewhere other than the public endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        let body = SearchBody {
            query,
            max_results,
            include_answer: false,
            include_raw_content: false,
        };

        debug!(query, max_results, "searching Tavily");
        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SearchError::Http {
                status: status.as_u16(),
                message: text,
            });
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| SearchError::MalformedResponse(e.to_string()))?;
        parse_results(&value)
    }
}

/// Extract hits from a Tavily response body; entries without a URL are skipped
pub fn parse_results(value: &Value) -> Result<Vec<SearchResult>, SearchError> {
    let results = value
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::MalformedResponse("no results array".to_string()))?;

    Ok(results
        .iter()
        .filter_map(|r| {
            let url = r.get("url")?.as_str()?.to_string();
            let title = r
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let content = r
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let score = r.get("score").and_then(Value::as_f64);
            Some(SearchResult {
                title,
                url,
                content,
                score,
            })
        })
        .collect())
}
