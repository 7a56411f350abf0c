//! Incident classification for self-repair.
//!
//! This module provides:
//! - static incident routing to a team and specialist agent
//! - a total incident-to-action classification
//! - the autonomous / human-required partition of remediation actions
//! - the router that announces one outcome event per recognized incident
//!
//! The router never performs a remediation. It classifies and announces.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::{kinds, Event, Severity};
use crate::metrics::METRICS;
use crate::obs::TraceSpan;

/// Source stamped on every outcome event.
pub const ROUTER_SOURCE: &str = "SelfRepairRouter";

/// Action id for incidents with no classification.
pub const UNKNOWN_ACTION: &str = "unknown";

/// Actions a specialist may perform without approval.
pub const AUTONOMOUS_ACTIONS: [&str; 15] = [
    "fix_type_errors",
    "update_docs",
    "add_test_stubs",
    "update_minor_deps",
    "fix_lint_errors",
    "regenerate_changelogs",
    "optimize_imports",
    "update_jsdoc",
    "retry_deploy",
    "restart_service",
    "cache_invalidation",
    "log_rotation",
    "draft_pr_description",
    "update_playbook_sops",
    "generate_coaching_content",
];

/// Actions that always need a human decision.
pub const HUMAN_REQUIRED_ACTIONS: [&str; 15] = [
    "delete_file",
    "change_env_vars",
    "modify_payment_logic",
    "change_auth_rbac",
    "upgrade_major_deps",
    "modify_governance",
    "send_outbound_message",
    "modify_kill_switch",
    "change_battery_limits",
    "modify_agent_permissions",
    "create_delete_tables",
    "financial_transaction",
    "modify_service_auth",
    "change_team_structure",
    "override_board_decision",
];

/// Team and specialist responsible for an incident type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairRoute {
    pub team: &'static str,
    pub specialist: &'static str,
}

/// Routing table. `None` for incident types the router does not handle.
pub fn route_incident(incident_type: &str) -> Option<RepairRoute> {
    let (team, specialist) = match incident_type {
        kinds::BUILD_HEALTH_DEGRADED => ("backend", "SystemDesigner"),
        kinds::TEST_REGRESSION_DETECTED => ("qa-testing", "RegressionBot"),
        kinds::DEPENDENCY_VULN_FOUND => ("backend", "SecurityEng"),
        kinds::DOCS_STALE => ("content-brand", "BackendCopyWriter"),
        kinds::PERFORMANCE_DEGRADED => ("platform-eng", "InfraOps"),
        kinds::AGENT_ACCURACY_LOW => ("coaches", "AgentSkillTrainer"),
        kinds::PLAYBOOK_STALE => ("coaches", "PlaybookCoach"),
        kinds::WORKFLOW_BOTTLENECK => ("coaches", "ProcessCoach"),
        kinds::BATTERY_BURN_ANOMALY => ("finance-billing", "CostOptimizer"),
        kinds::DEPLOY_FAILED => ("devops-ci", "PipelineEng"),
        _ => return None,
    };
    Some(RepairRoute { team, specialist })
}

/// Canonical remediation for an incident type. Total: unmapped types yield
/// [`UNKNOWN_ACTION`].
pub fn classify_action(incident_type: &str) -> &'static str {
    match incident_type {
        kinds::BUILD_HEALTH_DEGRADED => "fix_type_errors",
        kinds::TEST_REGRESSION_DETECTED => "add_test_stubs",
        // Always a human call, even for patch-level fixes.
        kinds::DEPENDENCY_VULN_FOUND => "upgrade_major_deps",
        kinds::DOCS_STALE => "update_docs",
        kinds::PERFORMANCE_DEGRADED => "restart_service",
        kinds::AGENT_ACCURACY_LOW => "generate_coaching_content",
        kinds::PLAYBOOK_STALE => "update_playbook_sops",
        kinds::WORKFLOW_BOTTLENECK => "generate_coaching_content",
        kinds::BATTERY_BURN_ANOMALY => "change_battery_limits",
        kinds::DEPLOY_FAILED => "retry_deploy",
        _ => UNKNOWN_ACTION,
    }
}

pub fn is_autonomous(action: &str) -> bool {
    AUTONOMOUS_ACTIONS.iter().any(|a| *a == action)
}

pub fn is_human_required(action: &str) -> bool {
    HUMAN_REQUIRED_ACTIONS.iter().any(|a| *a == action)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairCategory {
    AutoFixed,
    NeedsHuman,
}

/// Classification of one incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairOutcome {
    pub category: RepairCategory,
    pub original_event: String,
    pub original_type: String,
    pub routed_to: String,
    pub team: String,
    pub action: String,
    pub autonomous: bool,
    pub reason: Option<String>,
}

impl RepairOutcome {
    /// The outcome announced on the bus.
    pub fn to_event(&self) -> Event {
        let (event_type, severity) = match self.category {
            RepairCategory::AutoFixed => (kinds::REPAIR_COMPLETED, Severity::Low),
            RepairCategory::NeedsHuman => (kinds::REPAIR_NEEDS_HUMAN, Severity::High),
        };
        let mut payload = json!({
            "originalEvent": self.original_event,
            "originalType": self.original_type,
            "routedTo": self.routed_to,
            "team": self.team,
            "action": self.action,
            "autonomous": self.autonomous,
        });
        if let (Some(reason), Some(map)) = (&self.reason, payload.as_object_mut()) {
            map.insert("reason".to_string(), json!(reason));
        }
        Event::new(event_type, ROUTER_SOURCE, severity).with_payload(payload)
    }
}

/// Pure classification of an incident. `None` when the type is unrouted.
pub fn classify_incident(incident: &Event) -> Option<RepairOutcome> {
    let route = route_incident(&incident.event_type)?;
    let action = classify_action(&incident.event_type);
    let autonomous = is_autonomous(action);
    Some(RepairOutcome {
        category: if autonomous {
            RepairCategory::AutoFixed
        } else {
            RepairCategory::NeedsHuman
        },
        original_event: incident.id.clone(),
        original_type: incident.event_type.clone(),
        routed_to: route.specialist.to_string(),
        team: route.team.to_string(),
        action: action.to_string(),
        autonomous,
        reason: (!autonomous).then(|| format!("Action '{action}' requires human approval")),
    })
}

/// Stateful router: counts repairs and produces outcome events.
#[derive(Debug, Default)]
pub struct SelfRepairRouter {
    repairs: AtomicU64,
}

impl SelfRepairRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one incident. Returns the outcome event to publish, or `None`
    /// for event types the router does not handle. Never fails.
    pub fn handle(&self, incident: &Event) -> Option<Event> {
        let outcome = classify_incident(incident)?;
        let _span = TraceSpan::enter(&incident.id, ROUTER_SOURCE);

        self.repairs.fetch_add(1, Ordering::SeqCst);
        METRICS.inc_repairs();
        info!(
            event = "repair.classified",
            incident = %incident.event_type,
            action = %outcome.action,
            routed_to = %outcome.routed_to,
            team = %outcome.team,
            autonomous = outcome.autonomous,
        );

        Some(outcome.to_event())
    }

    pub fn total_repairs(&self) -> u64 {
        self.repairs.load(Ordering::SeqCst)
    }
}
