//! AOS Core Library
//!
//! Agent orchestration and governance runtime: task dispatch, the bounded
//! tool-augmented reasoning loop, launch governance, self-repair routing
//! and the ops digest.

pub mod completion;
pub mod config;
pub mod digest;
pub mod dispatch;
pub mod domain;
pub mod events;
pub mod governance;
pub mod memory;
pub mod metrics;
pub mod obs;
pub mod reasoning;
pub mod runtime;
pub mod self_repair;
pub mod telemetry;
pub mod tooling;

pub use completion::{CompletionError, CompletionRequest, CompletionService, HttpCompletionService};
pub use config::AosConfig;
pub use digest::{Digest, DigestAggregator, DigestCategory, DigestEntry, DigestStats};
pub use dispatch::{AgentRegistry, AgentStatus, RoutingTable, TaskDispatcher};
pub use domain::{
    kinds, AgentMessage, AgentProfile, AgentTier, AosError, Escalation, Event, ExecutionResult,
    MessageTarget, Result, Severity, TaskInput,
};
pub use events::{parse_event_line, BusError, EventSink, InMemoryEventBus, OpsPipeline};
pub use governance::{
    run_launch_review, DecisionLog, GovernanceEngine, JsonlDecisionLog, LaunchDecision,
    LaunchVote, MemoryDecisionLog, ReadinessAssessor, ReadinessContext, ReadinessReview,
};
pub use memory::MemoryStore;
pub use reasoning::{AgentReply, ReasoningEngine};
pub use runtime::{standard_roster, AgentRuntime};
pub use self_repair::{RepairCategory, RepairOutcome, SelfRepairRouter};
pub use tooling::{
    ApprovalGate, FnHandler, RiskLevel, Tool, ToolCatalog, ToolError, ToolHandler, ToolOutcome,
    ToolResult, ToolSpec,
};

/// AOS version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
