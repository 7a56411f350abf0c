//! Memory windows keyed by agent name.

use std::collections::HashMap;

use tokio::sync::Mutex;

use super::window::{AgentMemory, MemoryEntry, MemoryRole};

/// Owns one [`AgentMemory`] per agent name, created lazily.
#[derive(Debug)]
pub struct MemoryStore {
    capacity: usize,
    entry_chars: usize,
    windows: Mutex<HashMap<String, AgentMemory>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(10, 500)
    }
}

impl MemoryStore {
    pub fn new(capacity: usize, entry_chars: usize) -> Self {
        Self {
            capacity,
            entry_chars,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// `[role] content` lines for `agent`, oldest first. Empty for an agent
    /// with no history.
    pub async fn recent_context(&self, agent: &str) -> Vec<String> {
        let windows = self.windows.lock().await;
        windows
            .get(agent)
            .map(AgentMemory::recent_context)
            .unwrap_or_default()
    }

    pub async fn add(&self, agent: &str, entry: MemoryEntry) {
        let mut windows = self.windows.lock().await;
        self.window_mut(&mut windows, agent).add(entry);
    }

    /// Append a task and its final response as one step, so a reader never
    /// observes the task without its response.
    pub async fn record_exchange(&self, agent: &str, task: &str, response: &str, trace_id: &str) {
        let mut windows = self.windows.lock().await;
        let window = self.window_mut(&mut windows, agent);
        window.add(MemoryEntry::new(MemoryRole::User, task, Some(trace_id)));
        window.add(MemoryEntry::new(MemoryRole::Agent, response, Some(trace_id)));
    }

    pub async fn entries(&self, agent: &str) -> Vec<MemoryEntry> {
        let windows = self.windows.lock().await;
        windows
            .get(agent)
            .map(|w| w.entries().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn clear(&self, agent: &str) {
        if let Some(window) = self.windows.lock().await.get_mut(agent) {
            window.clear();
        }
    }

    fn window_mut<'a>(
        &self,
        windows: &'a mut HashMap<String, AgentMemory>,
        agent: &str,
    ) -> &'a mut AgentMemory {
        windows
            .entry(agent.to_string())
            .or_insert_with(|| AgentMemory::new(self.capacity, self.entry_chars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_windows_are_isolated_per_agent() {
        let store = MemoryStore::default();
        store.record_exchange("CFO", "burn?", "12k/month", "t-1").await;
        store.record_exchange("CMO", "campaign?", "drafted", "t-2").await;

        assert_eq!(
            store.recent_context("CFO").await,
            vec!["[user] burn?".to_string(), "[agent] 12k/month".to_string()]
        );
        assert_eq!(store.entries("CMO").await.len(), 2);
        assert!(store.recent_context("CTO").await.is_empty());
    }

    #[tokio::test]
    async fn test_window_bound_applies() {
        let store = MemoryStore::new(10, 500);
        for i in 0..8 {
            store
                .record_exchange("COO", &format!("task {i}"), "done", "t")
                .await;
        }
        let entries = store.entries("COO").await;
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].content, "task 3");
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryStore::default();
        store
            .add("CTO", MemoryEntry::new(MemoryRole::System, "boot", None))
            .await;
        store.clear("CTO").await;
        assert!(store.entries("CTO").await.is_empty());
    }
}
