//! Named agent handles.

use std::collections::BTreeMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{AgentProfile, AosError, Result};

/// Agents keyed by name. Re-registration replaces the previous profile.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: RwLock<BTreeMap<String, AgentProfile>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, agent: AgentProfile) {
        debug!(event = "registry.registered", agent = %agent.name, tier = %agent.tier);
        self.agents.write().await.insert(agent.name.clone(), agent);
    }

    pub async fn register_all<I>(&self, agents: I)
    where
        I: IntoIterator<Item = AgentProfile>,
    {
        let mut map = self.agents.write().await;
        for agent in agents {
            map.insert(agent.name.clone(), agent);
        }
    }

    pub async fn get(&self, name: &str) -> Option<AgentProfile> {
        self.agents.read().await.get(name).cloned()
    }

    /// All profiles, ordered by name.
    pub async fn list(&self) -> Vec<AgentProfile> {
        self.agents.read().await.values().cloned().collect()
    }

    pub async fn names(&self) -> Vec<String> {
        self.agents.read().await.keys().cloned().collect()
    }

    pub async fn set_online(&self, name: &str, online: bool) -> Result<()> {
        let mut agents = self.agents.write().await;
        let agent = agents
            .get_mut(name)
            .ok_or_else(|| AosError::AgentNotFound(name.to_string()))?;
        agent.online = online;
        Ok(())
    }

    /// `(online, total)`.
    pub async fn counts(&self) -> (usize, usize) {
        let agents = self.agents.read().await;
        let online = agents.values().filter(|a| a.online).count();
        (online, agents.len())
    }
}
