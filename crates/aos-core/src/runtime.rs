//! Runtime context: every shared component, owned by one value.
//!
//! Nothing in the crate is a process-wide singleton apart from the metric
//! counters, so independent runtimes can coexist in one process.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use crate::completion::CompletionService;
use crate::config::AosConfig;
use crate::digest::{Digest, DigestAggregator, DigestStats};
use crate::dispatch::{AgentRegistry, TaskDispatcher};
use crate::domain::{kinds, AgentProfile, AgentTier, Event, Result};
use crate::events::{BusError, InMemoryEventBus, OpsPipeline};
use crate::governance::{
    run_launch_review, standard_panel, Ceo, DecisionLog, GovernanceEngine, LaunchDecision,
    ReadinessContext,
};
use crate::memory::MemoryStore;
use crate::reasoning::ReasoningEngine;
use crate::self_repair::route_incident;
use crate::tooling::ToolCatalog;

pub struct AgentRuntime {
    config: AosConfig,
    registry: Arc<AgentRegistry>,
    memory: Arc<MemoryStore>,
    tools: Arc<ToolCatalog>,
    engine: Arc<ReasoningEngine>,
    dispatcher: TaskDispatcher,
    bus: Arc<InMemoryEventBus>,
    digest: Arc<DigestAggregator>,
    ops: OpsPipeline,
    governance: GovernanceEngine,
}

impl AgentRuntime {
    /// Wire a runtime. The config is validated first.
    pub fn new(
        config: AosConfig,
        completion: Arc<dyn CompletionService>,
        tools: ToolCatalog,
        decisions: Arc<dyn DecisionLog>,
    ) -> Result<Self> {
        config.validate()?;

        let registry = Arc::new(AgentRegistry::new());
        let memory = Arc::new(MemoryStore::new(
            config.reasoning.memory_window,
            config.reasoning.memory_entry_chars,
        ));
        let tools = Arc::new(tools);
        let engine = Arc::new(ReasoningEngine::new(
            completion,
            tools.clone(),
            memory.clone(),
            config.reasoning.clone(),
        ));
        let dispatcher = TaskDispatcher::new(registry.clone(), engine.clone());
        let bus = Arc::new(InMemoryEventBus::from_config(&config.bus));
        let digest = Arc::new(DigestAggregator::new(config.digest.window()));
        let ops = OpsPipeline::new(digest.clone(), bus.clone());
        let governance = GovernanceEngine::new(&config.governance, decisions);

        Ok(Self {
            config,
            registry,
            memory,
            tools,
            engine,
            dispatcher,
            bus,
            digest,
            ops,
            governance,
        })
    }

    pub fn config(&self) -> &AosConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn memory(&self) -> &Arc<MemoryStore> {
        &self.memory
    }

    pub fn tools(&self) -> &Arc<ToolCatalog> {
        &self.tools
    }

    pub fn engine(&self) -> &Arc<ReasoningEngine> {
        &self.engine
    }

    pub fn dispatcher(&self) -> &TaskDispatcher {
        &self.dispatcher
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    pub fn digest(&self) -> &Arc<DigestAggregator> {
        &self.digest
    }

    pub fn ops(&self) -> &OpsPipeline {
        &self.ops
    }

    pub fn governance(&self) -> &GovernanceEngine {
        &self.governance
    }

    pub async fn register_standard_roster(&self) {
        let roster = standard_roster();
        let count = roster.len();
        self.registry.register_all(roster).await;
        info!(event = "runtime.roster_registered", agents = count);
    }

    /// Publish `event` and run the ops pipeline over everything it caused.
    pub async fn ingest(
        &self,
        event: Event,
        rx: &mut broadcast::Receiver<Event>,
    ) -> std::result::Result<usize, BusError> {
        use crate::events::EventSink;
        self.bus.publish(event).await?;
        self.ops.drain(rx).await
    }

    /// Publish the buffered digest with current registry counts.
    pub async fn publish_digest(&self) -> std::result::Result<Digest, BusError> {
        let (agents_online, agents_total) = self.registry.counts().await;
        self.digest
            .publish(
                DigestStats {
                    agents_online,
                    agents_total,
                },
                self.bus.as_ref(),
            )
            .await
    }

    /// Full launch review with the standard panel and the CEO deciding.
    pub async fn launch_review(&self, ctx: &ReadinessContext) -> Result<LaunchDecision> {
        run_launch_review(
            ctx,
            &standard_panel(),
            &Ceo,
            &self.governance,
            self.bus.as_ref(),
        )
        .await
    }
}

fn executive(name: &str, team: &str, tools: &[&str], procedures: &[&str]) -> AgentProfile {
    AgentProfile::new(name, AgentTier::CSuite)
        .with_team(team)
        .with_tools(tools.iter().copied())
        .with_procedures(procedures.iter().copied())
}

/// The executive team plus one specialist per routed incident type.
pub fn standard_roster() -> Vec<AgentProfile> {
    let mut roster = vec![
        executive(
            "CEO",
            "strategy-intel",
            &["dashboard_metrics", "memory_search", "web_search"],
            &["Escalate irreversible decisions to the founder"],
        ),
        executive(
            "CFO",
            "finance-billing",
            &["payments_listTransactions", "dashboard_metrics", "advisor_calculate"],
            &["Report spend against the daily credit cap"],
        ),
        executive(
            "CMO",
            "marketing-growth",
            &["content_draft", "campaign_list", "web_search"],
            &["Every outbound message is a draft until approved"],
        ),
        executive(
            "CRO",
            "sales-crm",
            &["crm_listContacts", "crm_updateContact", "outreach_draft"],
            &[],
        ),
        executive(
            "COO",
            "governance-pmo",
            &["orders_list", "tasks_list", "cadence_status"],
            &["Check service health before reporting throughput"],
        ),
        executive(
            "CPO",
            "growth-hacking",
            &["funnel_metrics", "feedback_list"],
            &[],
        ),
        executive(
            "CTO",
            "platform-eng",
            &["system_status", "service_health", "deploy_status"],
            &["Never execute deploys, propose them as pull requests"],
        ),
        executive(
            "HeadCustomer",
            "customer-success",
            &["crm_listContacts", "messaging_history"],
            &[],
        ),
        executive(
            "HeadEngineering",
            "backend",
            &["ci_status", "service_health"],
            &[],
        ),
        executive("HeadGrowth", "growth-hacking", &["funnel_metrics"], &[]),
        executive(
            "HeadIntelligenceRisk",
            "legal-compliance",
            &["audit_log", "system_status"],
            &["Treat kill switch changes as human-only"],
        ),
    ];

    let mut specialists: BTreeMap<&str, &str> = BTreeMap::new();
    for incident in kinds::INCIDENTS {
        if let Some(route) = route_incident(incident) {
            specialists.insert(route.specialist, route.team);
        }
    }
    roster.extend(specialists.into_iter().map(|(name, team)| {
        let tier = if team == "coaches" {
            AgentTier::Coach
        } else {
            AgentTier::Team
        };
        AgentProfile::new(name, tier).with_team(team)
    }));
    roster
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{CompletionError, CompletionRequest};
    use crate::governance::MemoryDecisionLog;
    use crate::domain::Severity;
    use async_trait::async_trait;

    struct Silent;

    #[async_trait]
    impl CompletionService for Silent {
        async fn complete(&self, _: &CompletionRequest) -> std::result::Result<String, CompletionError> {
            Ok("noted".to_string())
        }
    }

    fn runtime() -> AgentRuntime {
        AgentRuntime::new(
            AosConfig::default(),
            Arc::new(Silent),
            ToolCatalog::new(),
            Arc::new(MemoryDecisionLog::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_roster_has_every_repair_specialist() {
        let roster = standard_roster();
        for incident in kinds::INCIDENTS {
            let route = route_incident(incident).unwrap();
            let agent = roster.iter().find(|a| a.name == route.specialist).unwrap();
            assert_eq!(agent.team.as_deref(), Some(route.team));
        }
        let coach = roster.iter().find(|a| a.name == "PlaybookCoach").unwrap();
        assert_eq!(coach.tier, AgentTier::Coach);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AosConfig::default();
        config.reasoning.max_iterations = 0;
        let result = AgentRuntime::new(
            config,
            Arc::new(Silent),
            ToolCatalog::new(),
            Arc::new(MemoryDecisionLog::new()),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_ingest_then_digest() {
        let rt = runtime();
        rt.register_standard_roster().await;
        let mut rx = rt.bus().subscribe();

        let handled = rt
            .ingest(
                Event::new(kinds::DOCS_STALE, "guardian", Severity::Medium),
                &mut rx,
            )
            .await
            .unwrap();
        assert_eq!(handled, 2);

        let digest = rt.publish_digest().await.unwrap();
        assert_eq!(digest.auto_fixed.len(), 1);
        assert_eq!(digest.agents_total, standard_roster().len());
        assert!(rt.digest().pending().await.is_empty());
    }

    #[tokio::test]
    async fn test_bus_history_follows_config() {
        let mut config = AosConfig::default();
        config.bus.history_limit = 5;
        let rt = AgentRuntime::new(
            config,
            Arc::new(Silent),
            ToolCatalog::new(),
            Arc::new(MemoryDecisionLog::new()),
        )
        .unwrap();
        let mut rx = rt.bus().subscribe();

        for _ in 0..4 {
            rt.ingest(Event::new(kinds::DOCS_STALE, "guardian", Severity::Low), &mut rx)
                .await
                .unwrap();
        }

        assert_eq!(rt.bus().history_limit(), 5);
        assert_eq!(rt.bus().history().await.len(), 5);
    }

    #[tokio::test]
    async fn test_dispatch_through_runtime() {
        let rt = runtime();
        rt.register_standard_roster().await;
        let result = rt.dispatcher().dispatch_to_agent("CFO", "status?", None).await;
        assert_eq!(result.response, "noted");
        assert_eq!(result.iterations, 1);
    }
}
