//! The bounded, tool-augmented reasoning loop.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{instrument, Span};
use uuid::Uuid;

use super::prompt::{build_system_context, PromptContext};
use super::reply::{parse_reply, AgentReply, ToolRequest};
use crate::completion::{CompletionError, CompletionRequest, CompletionService};
use crate::config::ReasoningConfig;
use crate::domain::{AgentProfile, ExecutionResult, TaskInput};
use crate::memory::window::truncate_chars;
use crate::memory::MemoryStore;
use crate::metrics::METRICS;
use crate::obs;
use crate::tooling::{ToolCatalog, ToolError, ToolOutcome, ToolResult};

/// Characters of tool data echoed back into the follow-up prompt.
const TOOL_DATA_PREVIEW_CHARS: usize = 200;

/// Runs agents against the completion service and the tool catalog.
pub struct ReasoningEngine {
    completion: Arc<dyn CompletionService>,
    tools: Arc<ToolCatalog>,
    memory: Arc<MemoryStore>,
    config: ReasoningConfig,
}

impl ReasoningEngine {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        tools: Arc<ToolCatalog>,
        memory: Arc<MemoryStore>,
        config: ReasoningConfig,
    ) -> Self {
        Self {
            completion,
            tools,
            memory,
            config,
        }
    }

    pub fn config(&self) -> &ReasoningConfig {
        &self.config
    }

    pub fn memory(&self) -> &Arc<MemoryStore> {
        &self.memory
    }

    /// Run `agent` on `task`. Never fails: completion and tool failures are
    /// folded into the returned result.
    ///
    /// The trace id is `trace_id`, else the message's own trace id, else a
    /// fresh UUID.
    #[instrument(skip_all, fields(agent = %agent.name, trace_id = tracing::field::Empty))]
    pub async fn execute(
        &self,
        agent: &AgentProfile,
        task: &TaskInput,
        trace_id: Option<&str>,
    ) -> ExecutionResult {
        let start = Instant::now();
        let trace_id = resolve_trace_id(task, trace_id);
        Span::current().record("trace_id", trace_id.as_str());

        let max_iterations = self.config.max_iterations;
        obs::emit_loop_started(&trace_id, &agent.name, max_iterations);

        let recent_memory = self.memory.recent_context(&agent.name).await;
        let system = build_system_context(&PromptContext {
            agent_name: &agent.name,
            tier: agent.tier,
            team: agent.team.as_deref(),
            allowed_tools: &agent.tools,
            recent_memory: &recent_memory,
            procedures: &agent.procedures,
        });

        let task_text = task.render();
        let mut prompt = task_text.clone();
        let mut response = String::new();
        let mut escalation = None;
        let mut tool_results: Vec<ToolOutcome> = Vec::new();
        let mut iterations: u32 = 0;

        for i in 0..max_iterations {
            iterations += 1;
            METRICS.inc_loop_iterations();
            obs::emit_loop_iteration(&trace_id, &agent.name, iterations);

            let request = CompletionRequest {
                system: system.clone(),
                prompt: prompt.clone(),
                trace_id: trace_id.clone(),
            };
            let raw = match self.complete(&request).await {
                Ok(text) => text,
                Err(err) => {
                    obs::emit_completion_failed(&trace_id, &agent.name, &err);
                    response = format!(
                        "Completion service unavailable: {err}. Agent {} cannot process this task.",
                        agent.name
                    );
                    break;
                }
            };

            let reply = parse_reply(&raw);
            if !reply.text().is_empty() {
                response = reply.text().to_string();
            }

            let actions = match reply {
                AgentReply::FinalAnswer(_) => break,
                AgentReply::EscalationRequested {
                    escalation: requested,
                    ..
                } => {
                    escalation = Some(requested);
                    break;
                }
                AgentReply::ActionsRequested { actions, .. } => actions,
            };

            let mut lines = Vec::with_capacity(actions.len());
            for action in &actions {
                let (outcome, line) = self.run_tool(agent, action, &trace_id).await;
                tool_results.push(outcome);
                lines.push(line);
            }

            if i + 1 < max_iterations {
                prompt = format!(
                    "Tool results:\n{}\n\nBased on these results, what's your next action? \
                     If done, provide your final response.",
                    lines.join("\n")
                );
            }
        }

        self.memory
            .record_exchange(&agent.name, &task_text, &response, &trace_id)
            .await;

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        obs::emit_loop_finished(
            &trace_id,
            &agent.name,
            iterations,
            tool_results.len(),
            escalation.is_some(),
            duration_ms,
        );

        ExecutionResult {
            agent_name: agent.name.clone(),
            response,
            tool_results,
            iterations,
            escalation,
            trace_id,
            duration_ms,
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let budget = self.config.completion_timeout();
        match tokio::time::timeout(budget, self.completion.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout {
                timeout_ms: self.config.completion_timeout_ms,
            }),
        }
    }

    async fn run_tool(
        &self,
        agent: &AgentProfile,
        action: &ToolRequest,
        trace_id: &str,
    ) -> (ToolOutcome, String) {
        METRICS.inc_tool_calls();

        let args = if action.args.is_null() {
            Value::Object(Default::default())
        } else {
            action.args.clone()
        };

        let call = if agent.may_use(&action.tool) {
            self.tools
                .call(&action.tool, &args, trace_id, self.config.tool_timeout())
                .await
        } else {
            Err(ToolError::NotPermitted {
                tool_name: action.tool.clone(),
                agent: agent.name.clone(),
            })
        };

        let outcome = ToolOutcome::from_call(&action.tool, &call);
        if !outcome.success {
            METRICS.inc_tool_failures();
            obs::emit_tool_failed(
                trace_id,
                &action.tool,
                outcome.error.as_deref().unwrap_or("unknown error"),
            );
        }
        (outcome, describe_call(&action.tool, &call))
    }
}

pub(crate) fn resolve_trace_id(task: &TaskInput, explicit: Option<&str>) -> String {
    let from_message = match task {
        TaskInput::Message(msg) => msg.trace_id.as_deref(),
        TaskInput::Text(_) => None,
    };
    explicit
        .or(from_message)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// One transcript line for the follow-up prompt.
pub(crate) fn describe_call(tool: &str, call: &Result<ToolResult, ToolError>) -> String {
    match call {
        Ok(result) => {
            let mut line = if result.success {
                format!("Tool {tool}: OK")
            } else {
                format!(
                    "Tool {tool}: FAILED: {}",
                    result.error.as_deref().unwrap_or("unknown error")
                )
            };
            if let Some(data) = result.data.as_ref().filter(|d| !d.is_null()) {
                line.push_str(" → ");
                line.push_str(&truncate_chars(&data.to_string(), TOOL_DATA_PREVIEW_CHARS));
            }
            line
        }
        Err(err) => format!("Tool {tool}: ERROR: {err}"),
    }
}
