#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use aos_core::{
    AgentRegistry, CompletionError, CompletionRequest, CompletionService, FnHandler, MemoryStore,
    ReadinessContext, ReasoningEngine, RiskLevel, Tool, ToolCatalog, ToolError, ToolResult,
    ToolSpec,
};
use aos_core::config::ReasoningConfig;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

/// Replies from a fixed script, then keeps repeating the last one.
/// Records every request it receives.
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    last: Mutex<Option<Result<String, CompletionError>>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_results(replies.into_iter().map(|r| Ok(r.into())))
    }

    pub fn from_results<I>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = Result<String, CompletionError>>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub async fn calls(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().await.push(request.clone());
        let next = self.replies.lock().await.pop_front();
        let mut last = self.last.lock().await;
        match next {
            Some(reply) => {
                *last = Some(reply.clone());
                reply
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(CompletionError::Transport("script empty".into()))),
        }
    }
}

/// Invocation log shared by recording tools.
pub type CallLog = Arc<Mutex<Vec<(String, Value)>>>;

/// A low-risk tool that appends `(name, args)` to `log` and succeeds.
pub fn recording_tool(name: &str, log: CallLog) -> Tool {
    let tool_name = name.to_string();
    Tool::new(
        ToolSpec::new(name, "records its calls", RiskLevel::Low),
        FnHandler(move |args: Value, _trace: String| {
            let log = log.clone();
            let tool_name = tool_name.clone();
            async move {
                log.lock().await.push((tool_name, args));
                Ok::<_, ToolError>(ToolResult::ok(json!({"recorded": true})))
            }
        }),
    )
}

/// A tool whose result is always `success: false`.
pub fn failing_tool(name: &str) -> Tool {
    Tool::new(
        ToolSpec::new(name, "always fails", RiskLevel::Low),
        FnHandler(|_args: Value, _trace: String| async move {
            Ok::<_, ToolError>(ToolResult::failed("upstream unavailable"))
        }),
    )
}

pub fn engine(
    completion: Arc<dyn CompletionService>,
    tools: ToolCatalog,
    max_iterations: u32,
) -> Arc<ReasoningEngine> {
    let config = ReasoningConfig {
        max_iterations,
        ..ReasoningConfig::default()
    };
    Arc::new(ReasoningEngine::new(
        completion,
        Arc::new(tools),
        Arc::new(MemoryStore::default()),
        config,
    ))
}

pub fn registry() -> Arc<AgentRegistry> {
    Arc::new(AgentRegistry::new())
}

/// A context every assessor is satisfied with, apart from standing caveats.
pub fn ready_context() -> ReadinessContext {
    ReadinessContext {
        kill_switch: false,
        tool_count: 68,
        system_status: "online".into(),
        ai_keys_configured: true,
        battery_remaining: 10.0,
        battery_daily_limit: 10.0,
        battery_depleted: false,
        services_healthy: vec!["gateway".into(), "workspace".into()],
        services_down: vec![],
        campaign_profile_count: 10,
        campaign_template_languages: vec!["es".into(), "en".into()],
        draft_first_enforced: true,
        webhook_crypto_enabled: true,
        rate_limiting_enabled: true,
        jwt_auth_enabled: true,
        semantic_router_active: true,
        messaging_connector_configured: true,
        workspace_configured: true,
        cadence_engine_enabled: true,
        funnel_stages_defined: 10,
        activation_target_minutes: 10,
        pricing_tiers_defined: 3,
        free_to_paid_path_defined: true,
    }
}
