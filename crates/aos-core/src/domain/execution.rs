//! The record returned by every dispatch and reasoning-loop invocation.

use serde::{Deserialize, Serialize};

use crate::tooling::ToolOutcome;

/// A request from an agent to route the task to someone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escalation {
    pub to: String,
    pub reason: String,
}

/// Outcome of one reasoning-loop invocation. Built once, never mutated after
/// it is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub agent_name: String,
    pub response: String,
    pub tool_results: Vec<ToolOutcome>,
    /// Completion calls attempted. Zero when the loop never ran.
    pub iterations: u32,
    pub escalation: Option<Escalation>,
    pub trace_id: String,
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// A result for a dispatch that never reached the loop.
    pub fn not_run(
        agent_name: impl Into<String>,
        response: impl Into<String>,
        trace_id: impl Into<String>,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            response: response.into(),
            tool_results: Vec::new(),
            iterations: 0,
            escalation: None,
            trace_id: trace_id.into(),
            duration_ms: 0,
        }
    }

    pub fn escalated(&self) -> bool {
        self.escalation.is_some()
    }

    pub fn failed_tools(&self) -> usize {
        self.tool_results.iter().filter(|r| !r.success).count()
    }
}
