//! Single-pass generation used when the crew fails
//!
//! One optional search, one draft, one polish, then local keyword extraction.
//! Model failures never abort it: an unavailable cascade yields the offline
//! notice and any other error is returned as `[Gemini Error] ...` text.

use tracing::{info, warn};

use super::events::{EventSink, PipelineEvent};
use super::keywords::extract_keywords;
use super::{ContentRequest, PipelineError, StageOutput};
use crate::llm::cascade::offline_notice;
use crate::llm::core::{
    config::GenerationConfig, error::LlmError, provider::LlmProvider, types::GenerateRequest,
};
use crate::search::{render_results, SearchProvider};

pub const RESEARCH_STAGE: &str = "ResearchAgent";
pub const WRITER_STAGE: &str = "WriterAgent";
pub const EDITOR_STAGE: &str = "EditorAgent";
pub const SEO_STAGE: &str = "SEOAgent";

pub const NO_RESEARCH: &str = "No research available";

/// Prefix of the text that stands in for a failed generation
pub const GEMINI_ERROR_PREFIX: &str = "[Gemini Error]";

const KEYWORD_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct FallbackOutput {
    pub final_output: String,
    pub stages: Vec<StageOutput>,
}

/// Fallback inputs borrowed from the pipeline
pub struct Fallback<'a> {
    pub provider: &'a dyn LlmProvider,
    /// `None` skips research
    pub search: Option<&'a dyn SearchProvider>,
    pub search_results: usize,
    pub generation: &'a GenerationConfig,
}

impl Fallback<'_> {
    /// Fails only with [`PipelineError::Cancelled`], once `events` is closed
    pub async fn run(
        &self,
        request: &ContentRequest,
        events: &EventSink,
    ) -> Result<FallbackOutput, PipelineError> {
        ensure_open(events, RESEARCH_STAGE)?;
        let research_text = self.research(&request.topic, events).await;

        ensure_open(events, WRITER_STAGE)?;
        let prompt = fallback_prompt(request, &research_text);
        events.send(PipelineEvent::StageStarted {
            agent: WRITER_STAGE.to_string(),
        });
        let generated = self.generate(prompt).await;
        stage_text(events, WRITER_STAGE, &generated);

        ensure_open(events, EDITOR_STAGE)?;
        events.send(PipelineEvent::StageStarted {
            agent: EDITOR_STAGE.to_string(),
        });
        let polished = self
            .generate(format!("Polish and refine this content:\n\n{}", generated))
            .await;
        stage_text(events, EDITOR_STAGE, &polished);

        events.send(PipelineEvent::StageStarted {
            agent: SEO_STAGE.to_string(),
        });
        let keywords = extract_keywords(&polished, KEYWORD_LIMIT);
        stage_text(events, SEO_STAGE, &keywords);

        let research_stage = if research_text.is_empty() {
            NO_RESEARCH.to_string()
        } else {
            research_text
        };

        Ok(FallbackOutput {
            final_output: polished.clone(),
            stages: vec![
                StageOutput::new(RESEARCH_STAGE, research_stage),
                StageOutput::new(WRITER_STAGE, generated),
                StageOutput::new(EDITOR_STAGE, polished),
                StageOutput::new(SEO_STAGE, keywords),
            ],
        })
    }

    /// Rendered search hits, or an empty string on any failure
    async fn research(&self, topic: &str, events: &EventSink) -> String {
        let Some(search) = self.search else {
            return String::new();
        };

        events.send(PipelineEvent::StageStarted {
            agent: RESEARCH_STAGE.to_string(),
        });
        let text = match search.search(topic, self.search_results).await {
            Ok(results) => render_results(&results),
            Err(e) => {
                warn!(error = %e, "fallback research failed, continuing without it");
                String::new()
            }
        };
        let shown = if text.is_empty() { NO_RESEARCH } else { &text };
        stage_text(events, RESEARCH_STAGE, shown);
        text
    }

    /// Generated text, the offline notice, or the error rendered as text
    async fn generate(&self, prompt: String) -> String {
        let request = GenerateRequest::prompt(prompt.clone(), self.generation.clone());
        match self.provider.generate_text(request).await {
            Ok(generation) => {
                info!(model = %generation.model, chars = generation.text.len(), "fallback generation");
                generation.text
            }
            Err(LlmError::AllModelsUnavailable { attempted }) => {
                warn!(attempted = ?attempted, "all models unavailable, using offline notice");
                offline_notice(&prompt)
            }
            Err(e) => {
                warn!(error = %e, "fallback generation failed");
                format!("{} {}", GEMINI_ERROR_PREFIX, e)
            }
        }
    }
}

fn ensure_open(events: &EventSink, stage: &str) -> Result<(), PipelineError> {
    if events.is_closed() {
        info!(stage, "event receiver gone, stopping fallback");
        return Err(PipelineError::Cancelled);
    }
    Ok(())
}

/// The single drafting prompt
pub fn fallback_prompt(request: &ContentRequest, research_text: &str) -> String {
    format!(
        "Write a {} on the topic: {}\n\
         Tone: {}\n\
         Length: {}\n\
         \n\
         Use this research if available:\n\
         \n\
         {}\n\
         \n\
         Structure it with:\n\
         - Title\n\
         - Meta description\n\
         - Introduction\n\
         - 4–6 subheadings\n\
         - Conclusion\n\
         - SEO keywords\n",
        request.content_type, request.topic, request.tone, request.length, research_text
    )
}

fn stage_text(events: &EventSink, agent: &str, text: &str) {
    events.send(PipelineEvent::AgentText {
        agent: agent.to_string(),
        chunk: text.to_string(),
    });
    events.send(PipelineEvent::StageCompleted {
        agent: agent.to_string(),
    });
}
