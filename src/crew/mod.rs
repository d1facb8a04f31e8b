//! Sequential multi-agent crew
//!
//! A crew is an ordered list of tasks. Each task is run by a fresh [`Agent`]
//! whose system prompt comes from the task's [`Role`]. Outputs of earlier tasks
//! are handed to later ones as context, and the last output is the crew's answer.

mod profile;
mod task;

pub use profile::{AgentProfile, Role};
pub use task::{CrewTask, TaskOutput};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{DEFAULT_MAX_ITERATIONS, DEFAULT_SEARCH_RESULTS};
use crate::llm::agent::{Agent, AgentError, AgentEvent};
use crate::llm::core::{config::GenerationConfig, provider::LlmProvider};
use crate::llm::tools::web_search_registry;
use crate::pipeline::ContentRequest;
use crate::search::SearchProvider;

#[derive(Debug, Error)]
pub enum CrewError {
    #[error("Crew has no tasks")]
    NoTasks,

    #[error("Crew stopped before {agent} could start")]
    Stopped { agent: String },

    #[error("{agent} failed: {source}")]
    TaskFailed {
        agent: String,
        #[source]
        source: AgentError,
    },
}

/// Knobs shared by every agent in the crew
#[derive(Debug, Clone)]
pub struct CrewSettings {
    pub generation: GenerationConfig,
    pub max_iterations: usize,
    /// Default `max_results` for the research agent's searches
    pub search_results: usize,
}

impl Default for CrewSettings {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            search_results: DEFAULT_SEARCH_RESULTS,
        }
    }
}

/// Progress reported while the crew runs
#[derive(Debug, Clone)]
pub enum CrewEvent {
    TaskStarted { agent: String, description: String },
    Agent { agent: String, event: AgentEvent },
    TaskCompleted { agent: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewOutput {
    pub final_output: String,
    pub tasks_output: Vec<TaskOutput>,
}

type StopCheck = Box<dyn Fn() -> bool + Send + Sync>;

pub struct Crew {
    provider: Arc<dyn LlmProvider>,
    search: Option<Arc<dyn SearchProvider>>,
    settings: CrewSettings,
    tasks: Vec<CrewTask>,
    stop: Option<StopCheck>,
}

impl Crew {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        search: Option<Arc<dyn SearchProvider>>,
        settings: CrewSettings,
    ) -> Self {
        Self {
            provider,
            search,
            settings,
            tasks: Vec::new(),
            stop: None,
        }
    }

    /// Checked before each task; the crew stops once it returns true
    pub fn stop_when<F>(&mut self, check: F) -> &mut Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.stop = Some(Box::new(check));
        self
    }

    pub fn add_task(&mut self, task: CrewTask) -> &mut Self {
        self.tasks.push(task);
        self
    }

    /// Run every task in order
    pub async fn kickoff<F>(&self, mut on_event: F) -> Result<CrewOutput, CrewError>
    where
        F: FnMut(CrewEvent) + Send,
    {
        if self.tasks.is_empty() {
            return Err(CrewError::NoTasks);
        }

        let mut tasks_output: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());

        for task in &self.tasks {
            let profile = task.role.profile();
            let agent_name = profile.name.clone();
            if self.stop.as_ref().is_some_and(|stop| stop()) {
                info!(agent = %agent_name, "crew stopped");
                return Err(CrewError::Stopped { agent: agent_name });
            }
            info!(agent = %agent_name, task = %task.description, "starting task");
            on_event(CrewEvent::TaskStarted {
                agent: agent_name.clone(),
                description: task.description.clone(),
            });

            let mut agent = self.agent_for(task.role, &profile);
            let prompt = task.prompt(&tasks_output);

            let output = agent
                .run_to_text(prompt, |event| {
                    on_event(CrewEvent::Agent {
                        agent: agent_name.clone(),
                        event: event.clone(),
                    })
                })
                .await
                .map_err(|source| {
                    warn!(agent = %agent_name, error = %source, "task failed");
                    CrewError::TaskFailed {
                        agent: agent_name.clone(),
                        source,
                    }
                })?;

            on_event(CrewEvent::TaskCompleted {
                agent: agent_name.clone(),
            });
            tasks_output.push(TaskOutput {
                agent: agent_name,
                description: task.description.clone(),
                output,
            });
        }

        let final_output = tasks_output
            .last()
            .map(|t| t.output.clone())
            .unwrap_or_default();

        Ok(CrewOutput {
            final_output,
            tasks_output,
        })
    }

    fn agent_for(&self, role: Role, profile: &AgentProfile) -> Agent {
        let agent = Agent::new(self.provider.clone(), self.settings.generation.clone())
            .with_system(profile.system_prompt())
            .with_max_iterations(self.settings.max_iterations);

        match (&self.search, role.uses_search()) {
            (Some(search), true) => {
                let registry = web_search_registry(search.clone(), self.settings.search_results);
                let declarations = registry.declarations();
                agent.with_tools(Box::new(registry), declarations)
            }
            _ => agent,
        }
    }
}

/// The research, writing, editing and SEO tasks for one request
///
/// The research task is left out when `research` is false.
pub fn content_tasks(request: &ContentRequest, research: bool) -> Vec<CrewTask> {
    let mut tasks = Vec::with_capacity(4);

    if research {
        tasks.push(CrewTask::new(
            Role::Research,
            format!("Research the topic '{}'.", request.topic),
            "Detailed research summary.",
        ));
    }

    tasks.push(CrewTask::new(
        Role::Writer,
        format!(
            "Write a {} about '{}', length {}, tone {}.",
            request.content_type, request.topic, request.length, request.tone
        ),
        "Structured content draft.",
    ));
    tasks.push(CrewTask::new(
        Role::Editor,
        "Polish and edit the draft.",
        "Refined content.",
    ));
    tasks.push(CrewTask::new(
        Role::Seo,
        "Generate SEO keywords and metadata.",
        "SEO suggestions.",
    ));

    tasks
}
