use serde::{Deserialize, Serialize};

use super::PipelineError;

pub const DEFAULT_CONTENT_TYPE: &str = "Blog Post";
pub const DEFAULT_LENGTH: &str = "Medium";
pub const DEFAULT_TONE: &str = "Professional";

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default = "default_length")]
    pub length: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default = "default_use_research")]
    pub use_research: bool,
}

fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}

fn default_length() -> String {
    DEFAULT_LENGTH.to_string()
}

fn default_tone() -> String {
    DEFAULT_TONE.to_string()
}

fn default_use_research() -> bool {
    true
}

impl Default for ContentRequest {
    fn default() -> Self {
        Self {
            topic: String::new(),
            content_type: default_content_type(),
            length: default_length(),
            tone: default_tone(),
            use_research: default_use_research(),
        }
    }
}

impl ContentRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    /// Reject requests that cannot produce content
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.topic.trim().is_empty() {
            return Err(PipelineError::InvalidRequest(
                "topic must not be empty".to_string(),
            ));
        }
        for (field, value) in [
            ("content_type", &self.content_type),
            ("length", &self.length),
            ("tone", &self.tone),
        ] {
            if value.trim().is_empty() {
                return Err(PipelineError::InvalidRequest(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }
        Ok(())
    }
}
