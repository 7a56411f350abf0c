//! Role-scoped instruction context for completion calls.

use crate::domain::AgentTier;

/// Tools listed in the instruction context before the remainder is elided.
pub const MAX_PROMPT_TOOLS: usize = 30;
/// Procedures listed in the instruction context.
pub const MAX_PROMPT_PROCEDURES: usize = 5;
/// Most recent memory lines listed in the instruction context.
pub const MAX_PROMPT_MEMORY: usize = 5;

const OPERATING_RULES: [&str; 6] = [
    "Outbound messages are drafts until a human approves them.",
    "Spend completion and tool budget only on work that moves the task forward.",
    "Every action is audited under the current trace id.",
    "If you cannot complete a task, escalate instead of failing silently.",
    "Prefer calling a tool over describing what a tool would do.",
    "Keep responses short and actionable.",
];

const RESPONSE_FORMAT: &str = r#"## Response Format
Respond with a JSON object:
```json
{
  "reasoning": "Brief explanation of your analysis",
  "actions": [
    { "tool": "tool_name", "args": { ... } }
  ],
  "response": "Your text response to the requester",
  "escalate": null
}
```
Set "escalate" to { "to": "AgentName", "reason": "why" } to hand the task off."#;

/// Everything the instruction context is built from.
#[derive(Debug, Clone)]
pub struct PromptContext<'a> {
    pub agent_name: &'a str,
    pub tier: AgentTier,
    pub team: Option<&'a str>,
    pub allowed_tools: &'a [String],
    pub recent_memory: &'a [String],
    pub procedures: &'a [String],
}

fn tier_instructions(tier: AgentTier) -> &'static str {
    match tier {
        AgentTier::CSuite => {
            "You are an executive. Make strategic decisions, delegate to teams and keep work \
             aligned with company goals. You may approve actions, allocate resources and escalate to the CEO."
        }
        AgentTier::Board => {
            "You are a board advisor. Give strategic guidance from your specialty. \
             Your votes are advisory and never block a decision on their own."
        }
        AgentTier::Governance => {
            "You are a governance agent. Track compliance and flag policy violations. \
             You do not act directly; you propose and review."
        }
        AgentTier::External => {
            "You are an external advisor. Offer an outside perspective on the question at hand."
        }
        AgentTier::Team => {
            "You are a team specialist. Execute tasks inside your domain and escalate \
             to your team lead or an executive when blocked."
        }
        AgentTier::Guardian => {
            "You are a service guardian. Watch service health, detect degradation and \
             trigger self-repair."
        }
        AgentTier::Coach => {
            "You are a coaching agent. Train other agents, maintain playbooks and improve processes."
        }
    }
}

/// Build the system context for one agent. Computed once per loop run.
pub fn build_system_context(ctx: &PromptContext<'_>) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("You are {}.", ctx.agent_name));
    match ctx.team {
        Some(team) => lines.push(format!("Tier: {} | Team: {team}", ctx.tier)),
        None => lines.push(format!("Tier: {}", ctx.tier)),
    }
    lines.push(String::new());
    lines.push(tier_instructions(ctx.tier).to_string());
    lines.push(String::new());

    lines.push("## Operating Rules".to_string());
    lines.extend(OPERATING_RULES.iter().map(|rule| format!("- {rule}")));
    lines.push(String::new());

    if !ctx.allowed_tools.is_empty() {
        lines.push("## Available Tools".to_string());
        lines.push("Request these tools through the \"actions\" list of your reply:".to_string());
        lines.extend(
            ctx.allowed_tools
                .iter()
                .take(MAX_PROMPT_TOOLS)
                .map(|tool| format!("- {tool}")),
        );
        if ctx.allowed_tools.len() > MAX_PROMPT_TOOLS {
            lines.push(format!(
                "... and {} more",
                ctx.allowed_tools.len() - MAX_PROMPT_TOOLS
            ));
        }
        lines.push(String::new());
    }

    if !ctx.procedures.is_empty() {
        lines.push("## Standard Operating Procedures".to_string());
        lines.extend(
            ctx.procedures
                .iter()
                .take(MAX_PROMPT_PROCEDURES)
                .map(|p| format!("- {p}")),
        );
        lines.push(String::new());
    }

    if !ctx.recent_memory.is_empty() {
        lines.push("## Recent Context".to_string());
        let skip = ctx.recent_memory.len().saturating_sub(MAX_PROMPT_MEMORY);
        lines.extend(ctx.recent_memory.iter().skip(skip).map(|m| format!("- {m}")));
        lines.push(String::new());
    }

    lines.push(RESPONSE_FORMAT.to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}")).collect()
    }

    #[test]
    fn test_sections_are_capped() {
        let tools = strings("tool_", 35);
        let memory = strings("mem ", 8);
        let procedures = strings("sop ", 7);
        let prompt = build_system_context(&PromptContext {
            agent_name: "CTO",
            tier: AgentTier::CSuite,
            team: Some("platform-eng"),
            allowed_tools: &tools,
            recent_memory: &memory,
            procedures: &procedures,
        });

        assert!(prompt.starts_with("You are CTO.\nTier: c-suite | Team: platform-eng"));
        assert!(prompt.contains("- tool_29\n"));
        assert!(!prompt.contains("- tool_30\n"));
        assert!(prompt.contains("... and 5 more"));
        assert!(prompt.contains("- sop 4\n"));
        assert!(!prompt.contains("- sop 5"));
        assert!(!prompt.contains("- mem 2\n"));
        assert!(prompt.contains("- mem 3\n"));
        assert!(prompt.contains("- mem 7\n"));
        assert!(prompt.contains("\"escalate\": null"));
    }

    #[test]
    fn test_empty_sections_omitted() {
        let prompt = build_system_context(&PromptContext {
            agent_name: "PlaybookCoach",
            tier: AgentTier::Coach,
            team: None,
            allowed_tools: &[],
            recent_memory: &[],
            procedures: &[],
        });
        assert!(prompt.contains("Tier: coach\n"));
        assert!(!prompt.contains("## Available Tools"));
        assert!(!prompt.contains("## Recent Context"));
    }
}
