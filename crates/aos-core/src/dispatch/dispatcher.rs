//! Task dispatch: resolve an agent, then run it through the reasoning loop.
//!
//! Unknown and offline agents are reported as ordinary results with zero
//! iterations. Nothing here returns an error for a bad target.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use super::registry::AgentRegistry;
use super::routing::RoutingTable;
use crate::domain::{AgentMessage, AgentProfile, ExecutionResult, Result, TaskInput};
use crate::metrics::METRICS;
use crate::obs;
use crate::reasoning::engine::resolve_trace_id;
use crate::reasoning::ReasoningEngine;

/// Profile plus recent memory, for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub profile: AgentProfile,
    pub recent_memory: Vec<String>,
}

pub struct TaskDispatcher {
    registry: Arc<AgentRegistry>,
    engine: Arc<ReasoningEngine>,
    routing: RoutingTable,
}

impl TaskDispatcher {
    pub fn new(registry: Arc<AgentRegistry>, engine: Arc<ReasoningEngine>) -> Self {
        Self {
            registry,
            engine,
            routing: RoutingTable::standard(),
        }
    }

    pub fn with_routing(mut self, routing: RoutingTable) -> Self {
        self.routing = routing;
        self
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    /// Run `task` on the named agent.
    #[instrument(skip_all, fields(agent = %name))]
    pub async fn dispatch_to_agent(
        &self,
        name: &str,
        task: impl Into<TaskInput>,
        trace_id: Option<&str>,
    ) -> ExecutionResult {
        METRICS.inc_dispatches();
        let task = task.into();

        let Some(agent) = self.registry.get(name).await else {
            let trace_id = resolve_trace_id(&task, trace_id);
            let available = self.registry.names().await.join(", ");
            obs::emit_dispatch_skipped(&trace_id, name, "not_found");
            return ExecutionResult::not_run(
                name,
                format!("Agent \"{name}\" not found. Available agents: {available}"),
                trace_id,
            );
        };

        if !agent.online {
            let trace_id = resolve_trace_id(&task, trace_id);
            obs::emit_dispatch_skipped(&trace_id, name, "offline");
            return ExecutionResult::not_run(
                name,
                format!("Agent \"{name}\" is offline."),
                trace_id,
            );
        }

        self.engine.execute(&agent, &task, trace_id).await
    }

    /// Deliver a message to its primary target. `None` when the message names
    /// no target at all.
    pub async fn dispatch_message(&self, message: AgentMessage) -> Option<ExecutionResult> {
        let target = message.target.primary()?.to_string();
        let trace_id = message.trace_id.clone();
        Some(
            self.dispatch_to_agent(&target, message, trace_id.as_deref())
                .await,
        )
    }

    /// Pick an agent for a free-text question by keyword, then dispatch.
    pub async fn route_question(&self, text: &str, trace_id: Option<&str>) -> ExecutionResult {
        let agent = self.routing.route(text).to_string();
        let trace_id = trace_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        info!(event = "dispatch.routed", agent = %agent, trace_id = %trace_id);
        self.dispatch_to_agent(&agent, text, Some(&trace_id)).await
    }

    pub async fn agent_status(&self, name: &str) -> Option<AgentStatus> {
        let profile = self.registry.get(name).await?;
        let recent_memory = self.engine.memory().recent_context(name).await;
        Some(AgentStatus {
            profile,
            recent_memory,
        })
    }

    pub async fn set_online(&self, name: &str, online: bool) -> Result<()> {
        self.registry.set_online(name, online).await?;
        info!(event = "dispatch.availability", agent = %name, online = online);
        Ok(())
    }
}
