//! Agent personas

use std::fmt;

use serde::{Deserialize, Serialize};

/// The four members of the content crew
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Research,
    Writer,
    Editor,
    Seo,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Research, Role::Writer, Role::Editor, Role::Seo];

    /// Whether agents in this role get the `web_search` tool
    pub fn uses_search(self) -> bool {
        matches!(self, Role::Research)
    }

    pub fn profile(self) -> AgentProfile {
        match self {
            Role::Research => AgentProfile::new(
                "Research Agent",
                "Research Specialist",
                "Collect verified information using Tavily search.",
                "A professional researcher who extracts the most relevant details.",
            ),
            Role::Writer => AgentProfile::new(
                "Writer Agent",
                "Content Writer",
                "Write high-quality structured content.",
                "A professional writer with strong SEO knowledge.",
            ),
            Role::Editor => AgentProfile::new(
                "Editor Agent",
                "Editor",
                "Refine, improve clarity, and polish writing.",
                "A grammar-driven expert editor.",
            ),
            Role::Seo => AgentProfile::new(
                "SEO Agent",
                "SEO Specialist",
                "Generate SEO-friendly keywords, tags, and metadata.",
                "Expert in making content rank on search engines.",
            ),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Research => "research",
            Role::Writer => "writer",
            Role::Editor => "editor",
            Role::Seo => "seo",
        })
    }
}

/// Who an agent is, rendered into its system prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl AgentProfile {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}, a {}. Your goal: {} Background: {}",
            self.name, self.role, self.goal, self.backstory
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles() {
        let names: Vec<String> = Role::ALL.iter().map(|r| r.profile().name).collect();
        assert_eq!(
            names,
            vec!["Research Agent", "Writer Agent", "Editor Agent", "SEO Agent"]
        );
        assert_eq!(Role::Seo.profile().role, "SEO Specialist");
    }

    #[test]
    fn test_only_research_searches() {
        assert!(Role::Research.uses_search());
        assert!(!Role::Writer.uses_search());
        assert!(!Role::Editor.uses_search());
        assert!(!Role::Seo.uses_search());
    }

    #[test]
    fn test_system_prompt() {
        let prompt = Role::Editor.profile().system_prompt();
        assert_eq!(
            prompt,
            "You are Editor Agent, a Editor. Your goal: Refine, improve clarity, and polish writing. \
             Background: A grammar-driven expert editor."
        );
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Seo).unwrap(), r#""seo""#);
        let role: Role = serde_json::from_str(r#""research""#).unwrap();
        assert_eq!(role, Role::Research);
    }
}
