//! Web search used by the research stage
//!
//! `SearchProvider` is the seam between agents and a concrete search API.
//! The only production implementation is [`TavilyClient`].

pub mod tavily;

pub use tavily::TavilyClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a search backend
#[derive(Debug, Error)]
pub enum SearchError {
    /// No API key configured
    #[error("Search is not configured: {0}")]
    NotConfigured(String),

    /// Transport failure or non-success status
    #[error("Search request failed (status {status}): {message}")]
    Http { status: u16, message: String },

    /// Body did not have the expected shape
    #[error("Malformed search response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::Http {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            message: err.to_string(),
        }
    }
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// Extracted page snippet
    #[serde(default)]
    pub content: String,
    /// Relevance score reported by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl SearchResult {
    /// Single-line form used when results are pasted into prompts
    pub fn render(&self) -> String {
        let snippet = self.content.split_whitespace().collect::<Vec<_>>().join(" ");
        if snippet.is_empty() {
            format!("{} ({})", self.title, self.url)
        } else {
            format!("{} ({}): {}", self.title, self.url, snippet)
        }
    }
}

/// Join rendered results, one per line
pub fn render_results(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(SearchResult::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A web search backend
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError>;
}
