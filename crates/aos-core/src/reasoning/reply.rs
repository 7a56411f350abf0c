//! Completion reply classification.
//!
//! A reply is either a structured JSON object (possibly wrapped in prose) or
//! free text. Anything that does not match the structured shape collapses to
//! [`AgentReply::FinalAnswer`] carrying the raw text.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::Escalation;

/// Outermost `{...}` span of a reply.
static JSON_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid json span regex"));

const STRUCTURED_KEYS: [&str; 4] = ["reasoning", "actions", "response", "escalate"];

/// One tool call requested by the agent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolRequest {
    pub tool: String,
    #[serde(default)]
    pub args: Value,
}

/// A classified completion reply. `text` is the reply's `response` field,
/// empty when the reply carried none.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentReply {
    FinalAnswer(String),
    EscalationRequested {
        escalation: Escalation,
        text: String,
    },
    ActionsRequested {
        actions: Vec<ToolRequest>,
        text: String,
    },
}

impl AgentReply {
    pub fn text(&self) -> &str {
        match self {
            Self::FinalAnswer(text) => text,
            Self::EscalationRequested { text, .. } | Self::ActionsRequested { text, .. } => text,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StructuredReply {
    #[serde(default)]
    reasoning: Option<Value>,
    #[serde(default)]
    actions: Option<Vec<ToolRequest>>,
    #[serde(default)]
    response: Option<String>,
    #[serde(default, deserialize_with = "lenient_escalation")]
    escalate: Option<Escalation>,
}

/// `false`, `null`, `{}` and any other value without a string `to` mean no
/// escalation. A missing `reason` is empty.
fn lenient_escalation<'de, D>(deserializer: D) -> Result<Option<Escalation>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Some(to) = value.get("to").and_then(Value::as_str).filter(|to| !to.is_empty()) else {
        return Ok(None);
    };
    let reason = value
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Ok(Some(Escalation {
        to: to.to_string(),
        reason: reason.to_string(),
    }))
}

/// Classify a raw completion reply.
pub fn parse_reply(raw: &str) -> AgentReply {
    match structured(raw) {
        Some(reply) => {
            match reply.reasoning {
                Some(Value::String(reasoning)) if !reasoning.is_empty() => {
                    tracing::debug!(event = "loop.reasoning", reasoning = %reasoning);
                }
                Some(Value::Null) | Some(Value::String(_)) | None => {}
                Some(other) => tracing::debug!(event = "loop.reasoning", reasoning = %other),
            }
            let text = reply.response.unwrap_or_default();
            if let Some(escalation) = reply.escalate {
                return AgentReply::EscalationRequested { escalation, text };
            }
            match reply.actions {
                Some(actions) if !actions.is_empty() => {
                    AgentReply::ActionsRequested { actions, text }
                }
                _ => AgentReply::FinalAnswer(text),
            }
        }
        None => AgentReply::FinalAnswer(raw.to_string()),
    }
}

fn structured(raw: &str) -> Option<StructuredReply> {
    let span = JSON_SPAN.find(raw)?;
    let value: Value = serde_json::from_str(span.as_str()).ok()?;
    let object = value.as_object()?;
    if !STRUCTURED_KEYS.iter().any(|key| object.contains_key(*key)) {
        return None;
    }
    serde_json::from_value(value).ok()
}
