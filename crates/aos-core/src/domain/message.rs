//! Task and message envelopes routed to agents.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Recipient(s) of an [`AgentMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageTarget {
    One(String),
    Many(Vec<String>),
}

impl MessageTarget {
    /// The agent a message is delivered to: the single name, or the first
    /// entry of a list. `None` when the list is empty.
    pub fn primary(&self) -> Option<&str> {
        match self {
            Self::One(name) => Some(name.as_str()),
            Self::Many(names) => names.first().map(String::as_str),
        }
    }
}

/// A routed message between agents or from an external service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub id: String,
    pub source: String,
    pub target: MessageTarget,
    pub payload: Value,
    pub trace_id: Option<String>,
}

impl AgentMessage {
    pub fn new(source: impl Into<String>, target: MessageTarget, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source: source.into(),
            target,
            payload,
            trace_id: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

/// The work handed to the reasoning loop.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskInput {
    Text(String),
    Message(AgentMessage),
}

impl TaskInput {
    /// Prompt text for the first completion call.
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Message(msg) => format!("Task from {}: {}", msg.source, msg.payload),
        }
    }
}

impl From<&str> for TaskInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TaskInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<AgentMessage> for TaskInput {
    fn from(msg: AgentMessage) -> Self {
        Self::Message(msg)
    }
}
