//! Bounded ring buffer of one agent's recent exchanges.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Characters of an entry shown in a context line.
const CONTEXT_LINE_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryRole {
    User,
    Agent,
    System,
}

impl MemoryRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub role: MemoryRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub trace_id: Option<String>,
}

impl MemoryEntry {
    pub fn new(role: MemoryRole, content: impl Into<String>, trace_id: Option<&str>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            trace_id: trace_id.map(str::to_string),
        }
    }
}

/// Rolling window holding at most `capacity` entries, each truncated to
/// `entry_chars` characters.
#[derive(Debug, Clone)]
pub struct AgentMemory {
    capacity: usize,
    entry_chars: usize,
    entries: VecDeque<MemoryEntry>,
}

impl AgentMemory {
    pub fn new(capacity: usize, entry_chars: usize) -> Self {
        Self {
            capacity,
            entry_chars,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, mut entry: MemoryEntry) {
        entry.content = truncate_chars(&entry.content, self.entry_chars);
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Entries rendered as `[role] content`, oldest first.
    pub fn recent_context(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| {
                format!(
                    "[{}] {}",
                    e.role.as_str(),
                    truncate_chars(&e.content, CONTEXT_LINE_CHARS)
                )
            })
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &MemoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// First `max` characters of `text`, respecting char boundaries.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
