//! Agent profiles: the registry's view of a named, role-scoped agent.

use serde::{Deserialize, Serialize};

/// Organisational tier an agent operates at. Drives the instruction block
/// the reasoning loop builds for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentTier {
    CSuite,
    Board,
    Governance,
    External,
    Team,
    Guardian,
    Coach,
}

impl AgentTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CSuite => "c-suite",
            Self::Board => "board",
            Self::Governance => "governance",
            Self::External => "external",
            Self::Team => "team",
            Self::Guardian => "guardian",
            Self::Coach => "coach",
        }
    }
}

impl std::fmt::Display for AgentTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered agent.
///
/// `tools` is the agent's capability set: the only tool names the reasoning
/// loop will execute on its behalf. `procedures` are short standard operating
/// procedure summaries surfaced in the agent's instruction context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub name: String,
    pub tier: AgentTier,
    pub team: Option<String>,
    pub online: bool,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub procedures: Vec<String>,
}

impl AgentProfile {
    /// An online agent with no tools or procedures.
    pub fn new(name: impl Into<String>, tier: AgentTier) -> Self {
        Self {
            name: name.into(),
            tier,
            team: None,
            online: true,
            tools: Vec::new(),
            procedures: Vec::new(),
        }
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_procedures<I, S>(mut self, procedures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.procedures = procedures.into_iter().map(Into::into).collect();
        self
    }

    pub fn offline(mut self) -> Self {
        self.online = false;
        self
    }

    /// Whether `tool` is in this agent's capability set.
    pub fn may_use(&self, tool: &str) -> bool {
        self.tools.iter().any(|t| t == tool)
    }
}
