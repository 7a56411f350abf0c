//! Bus events and the event-name contracts shared by every component.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// Named event types. Only these names are contractual; transport is not.
pub mod kinds {
    // Incidents routed by the self-repair router.
    pub const BUILD_HEALTH_DEGRADED: &str = "BUILD_HEALTH_DEGRADED";
    pub const TEST_REGRESSION_DETECTED: &str = "TEST_REGRESSION_DETECTED";
    pub const DEPENDENCY_VULN_FOUND: &str = "DEPENDENCY_VULN_FOUND";
    pub const DOCS_STALE: &str = "DOCS_STALE";
    pub const PERFORMANCE_DEGRADED: &str = "PERFORMANCE_DEGRADED";
    pub const AGENT_ACCURACY_LOW: &str = "AGENT_ACCURACY_LOW";
    pub const PLAYBOOK_STALE: &str = "PLAYBOOK_STALE";
    pub const WORKFLOW_BOTTLENECK: &str = "WORKFLOW_BOTTLENECK";
    pub const BATTERY_BURN_ANOMALY: &str = "BATTERY_BURN_ANOMALY";
    pub const DEPLOY_FAILED: &str = "DEPLOY_FAILED";

    pub const INCIDENTS: [&str; 10] = [
        BUILD_HEALTH_DEGRADED,
        TEST_REGRESSION_DETECTED,
        DEPENDENCY_VULN_FOUND,
        DOCS_STALE,
        PERFORMANCE_DEGRADED,
        AGENT_ACCURACY_LOW,
        PLAYBOOK_STALE,
        WORKFLOW_BOTTLENECK,
        BATTERY_BURN_ANOMALY,
        DEPLOY_FAILED,
    ];

    // Repair outcomes.
    pub const REPAIR_COMPLETED: &str = "REPAIR_COMPLETED";
    pub const REPAIR_NEEDS_HUMAN: &str = "REPAIR_NEEDS_HUMAN";

    // Digest feeds.
    pub const AGENT_RETRAIN_NEEDED: &str = "AGENT_RETRAIN_NEEDED";
    pub const PROCESS_IMPROVEMENT_PROPOSAL: &str = "PROCESS_IMPROVEMENT_PROPOSAL";
    pub const WAR_ROOM_ACTIVATED: &str = "WAR_ROOM_ACTIVATED";
    pub const OPS_DIGEST: &str = "OPS_DIGEST";

    // Launch governance.
    pub const LAUNCH_REVIEW_REQUESTED: &str = "LAUNCH_REVIEW_REQUESTED";
    pub const LAUNCH_REVIEW_SUBMITTED: &str = "LAUNCH_REVIEW_SUBMITTED";
    pub const LAUNCH_APPROVED: &str = "LAUNCH_APPROVED";
    pub const LAUNCH_BLOCKED: &str = "LAUNCH_BLOCKED";
}

/// A single event on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub event_type: String,
    pub source: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub payload: Value,
}

impl Event {
    /// A new event with a fresh id, stamped now, and an empty object payload.
    pub fn new(event_type: impl Into<String>, source: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            source: source.into(),
            severity,
            timestamp: Utc::now(),
            payload: Value::Object(Map::new()),
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// String view of a payload field. Non-string scalars are rendered.
    pub fn payload_str(&self, key: &str) -> Option<String> {
        match self.payload.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
