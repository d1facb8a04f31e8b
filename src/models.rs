// Server state and response bodies

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::ContentPipeline;

/// Shared by every request
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ContentPipeline>,
    pub models: Vec<String>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: ContentPipeline, models: Vec<String>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            models,
            started_at: Utc::now(),
        }
    }

    pub fn research_enabled(&self) -> bool {
        self.pipeline.research_available()
    }
}

// GET /api/v1/health
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub research_enabled: bool,
    pub models: Vec<String>,
    pub started_at: DateTime<Utc>,
}

impl HealthResponse {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            status: "ok".to_string(),
            research_enabled: state.research_enabled(),
            models: state.models.clone(),
            started_at: state.started_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
