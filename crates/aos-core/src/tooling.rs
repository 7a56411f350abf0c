//! Tool invocation contract.
//!
//! Every domain capability (CRM mutations, content generation, payment
//! collection, ...) plugs into the runtime as a [`Tool`]: a declared
//! [`ToolSpec`] plus an async [`ToolHandler`]. The reasoning loop only ever
//! sees the uniform [`ToolOutcome`] shape.
//!
//! Risk gating is the handler's concern. [`ApprovalGate`] is the stock
//! wrapper for high and critical tools.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Argument key an [`ApprovalGate`] checks before executing.
pub const APPROVAL_TOKEN_ARG: &str = "approval_token";

/// Risk classification declared by a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn requires_approval(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

/// Declared shape of a tool, surfaced to the reasoning step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON-schema-like description of expected arguments.
    pub parameters: Value,
    pub risk: RiskLevel,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, risk: RiskLevel) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({ "type": "object", "properties": {} }),
            risk,
        }
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }
}

/// What a handler reports back when it ran to completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Per-call record kept on an [`ExecutionResult`](crate::domain::ExecutionResult).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub tool: String,
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl ToolOutcome {
    /// Fold a call result into the uniform outcome shape.
    pub fn from_call(tool: &str, call: &Result<ToolResult, ToolError>) -> Self {
        match call {
            Ok(result) => Self {
                tool: tool.to_string(),
                success: result.success,
                data: result.data.clone(),
                error: result.error.clone(),
            },
            Err(err) => Self {
                tool: tool.to_string(),
                success: false,
                data: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Tool failure taxonomy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("unknown tool: {tool_name}")]
    UnknownTool { tool_name: String },

    #[error("duplicate tool registration: {tool_name}")]
    DuplicateTool { tool_name: String },

    #[error("tool '{tool_name}' is not permitted for agent {agent}")]
    NotPermitted { tool_name: String, agent: String },

    #[error("approval required for {risk:?}-risk tool '{tool_name}'")]
    ApprovalRequired { tool_name: String, risk: RiskLevel },

    #[error("tool '{tool_name}' timed out after {timeout_ms}ms")]
    Timeout { tool_name: String, timeout_ms: u64 },

    #[error("tool '{tool_name}' failed: {message}")]
    Handler { tool_name: String, message: String },
}

impl ToolError {
    pub fn handler(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }
}

/// Executor contract for a single tool.
#[async_trait]
pub trait ToolHandler: Send + Sync + 'static {
    async fn execute(&self, args: &Value, trace_id: &str) -> Result<ToolResult, ToolError>;
}

/// Adapts an async closure `(args, trace_id) -> Result<ToolResult, ToolError>`.
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(Value, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ToolResult, ToolError>> + Send + 'static,
{
    async fn execute(&self, args: &Value, trace_id: &str) -> Result<ToolResult, ToolError> {
        (self.0)(args.clone(), trace_id.to_string()).await
    }
}

/// Refuses calls to a high/critical tool unless the arguments carry a
/// non-empty [`APPROVAL_TOKEN_ARG`].
pub struct ApprovalGate<H> {
    tool_name: String,
    risk: RiskLevel,
    inner: H,
}

impl<H: ToolHandler> ApprovalGate<H> {
    pub fn new(spec: &ToolSpec, inner: H) -> Self {
        Self {
            tool_name: spec.name.clone(),
            risk: spec.risk,
            inner,
        }
    }
}

#[async_trait]
impl<H: ToolHandler> ToolHandler for ApprovalGate<H> {
    async fn execute(&self, args: &Value, trace_id: &str) -> Result<ToolResult, ToolError> {
        if self.risk.requires_approval() {
            let approved = args
                .get(APPROVAL_TOKEN_ARG)
                .and_then(Value::as_str)
                .is_some_and(|token| !token.trim().is_empty());
            if !approved {
                return Err(ToolError::ApprovalRequired {
                    tool_name: self.tool_name.clone(),
                    risk: self.risk,
                });
            }
        }
        self.inner.execute(args, trace_id).await
    }
}

/// A registered tool.
#[derive(Clone)]
pub struct Tool {
    pub spec: ToolSpec,
    handler: Arc<dyn ToolHandler>,
}

impl Tool {
    pub fn new(spec: ToolSpec, handler: impl ToolHandler) -> Self {
        Self {
            spec,
            handler: Arc::new(handler),
        }
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool").field("spec", &self.spec).finish()
    }
}

/// In-memory tool catalog keyed by tool name.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: HashMap<String, Tool>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Tool) -> Result<(), ToolError> {
        if self.tools.contains_key(&tool.spec.name) {
            return Err(ToolError::DuplicateTool {
                tool_name: tool.spec.name,
            });
        }
        self.tools.insert(tool.spec.name.clone(), tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.get(name).map(|t| &t.spec)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Specs sorted by name.
    pub fn specs(&self) -> Vec<&ToolSpec> {
        let mut specs: Vec<&ToolSpec> = self.tools.values().map(|t| &t.spec).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run one tool under `timeout`. Expiry is reported as
    /// [`ToolError::Timeout`] and never retried.
    pub async fn call(
        &self,
        name: &str,
        args: &Value,
        trace_id: &str,
        timeout: Duration,
    ) -> Result<ToolResult, ToolError> {
        let tool = self.tools.get(name).ok_or_else(|| ToolError::UnknownTool {
            tool_name: name.to_string(),
        })?;

        match tokio::time::timeout(timeout, tool.handler.execute(args, trace_id)).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout {
                tool_name: name.to_string(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    /// [`call`](Self::call) folded into a [`ToolOutcome`]. Never fails.
    pub async fn invoke(
        &self,
        name: &str,
        args: &Value,
        trace_id: &str,
        timeout: Duration,
    ) -> ToolOutcome {
        let call = self.call(name, args, trace_id, timeout).await;
        ToolOutcome::from_call(name, &call)
    }
}
