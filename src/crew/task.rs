use serde::{Deserialize, Serialize};

use super::profile::Role;

/// One unit of crew work, assigned to a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewTask {
    pub role: Role,
    pub description: String,
    pub expected_output: String,
}

impl CrewTask {
    pub fn new(role: Role, description: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            role,
            description: description.into(),
            expected_output: expected_output.into(),
        }
    }

    /// User message for this task, carrying earlier outputs as context
    pub fn prompt(&self, context: &[TaskOutput]) -> String {
        let mut prompt = format!(
            "{}\n\nExpected output: {}",
            self.description, self.expected_output
        );

        if !context.is_empty() {
            prompt.push_str("\n\nContext from previous tasks:");
            for previous in context {
                prompt.push_str(&format!(
                    "\n\n## {} ({})\n{}",
                    previous.agent, previous.description, previous.output
                ));
            }
        }

        prompt
    }
}

/// Result of one finished task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Name of the agent that ran the task
    pub agent: String,
    pub description: String,
    pub output: String,
}
