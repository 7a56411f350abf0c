//! In-process event bus.
//!
//! Publication fans out over a `tokio::sync::broadcast` channel. The most
//! recent events are retained in an ordered, bounded history for inspection.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::config::BusConfig;
use crate::domain::Event;


#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("event bus is closed")]
    Closed,

    #[error("event rejected: {0}")]
    Rejected(String),
}

/// Anything events can be published to.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: Event) -> Result<(), BusError>;
}

pub struct InMemoryEventBus {
    sender: broadcast::Sender<Event>,
    history: RwLock<VecDeque<Event>>,
    history_limit: usize,
    closed: AtomicBool,
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::from_config(&BusConfig::default())
    }
}

impl InMemoryEventBus {
    /// A bus with `capacity` per subscriber and the default history limit.
    pub fn new(capacity: usize) -> Self {
        Self::with_history_limit(capacity, BusConfig::default().history_limit)
    }

    pub fn from_config(config: &BusConfig) -> Self {
        Self::with_history_limit(config.capacity, config.history_limit)
    }

    pub fn with_history_limit(capacity: usize, history_limit: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        let history_limit = history_limit.max(1);
        Self {
            sender,
            history: RwLock::new(VecDeque::with_capacity(history_limit.min(1024))),
            history_limit,
            closed: AtomicBool::new(false),
        }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Receive every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Retained events, oldest first.
    pub async fn history(&self) -> Vec<Event> {
        self.history.read().await.iter().cloned().collect()
    }

    pub async fn history_of(&self, event_type: &str) -> Vec<Event> {
        self.history
            .read()
            .await
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// Refuse further publication.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSink for InMemoryEventBus {
    async fn publish(&self, event: Event) -> Result<(), BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }
        if event.event_type.trim().is_empty() {
            return Err(BusError::Rejected("event type is empty".to_string()));
        }

        debug!(
            event = "bus.published",
            event_type = %event.event_type,
            source = %event.source,
            id = %event.id,
        );
        {
            let mut history = self.history.write().await;
            if history.len() == self.history_limit {
                history.pop_front();
            }
            history.push_back(event.clone());
        }
        // No live subscribers is fine; the history still has it.
        let _ = self.sender.send(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{kinds, Severity};

    #[tokio::test]
    async fn test_publish_reaches_subscriber_and_history() {
        let bus = InMemoryEventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(Event::new(kinds::DOCS_STALE, "guardian", Severity::Low))
            .await
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type, kinds::DOCS_STALE);
        assert_eq!(bus.history().await.len(), 1);
        assert_eq!(bus.history_of(kinds::DEPLOY_FAILED).await.len(), 0);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = InMemoryEventBus::new(4);
        bus.publish(Event::new(kinds::DEPLOY_FAILED, "ci", Severity::High))
            .await
            .unwrap();
        assert_eq!(bus.history_of(kinds::DEPLOY_FAILED).await.len(), 1);
    }

    #[tokio::test]
    async fn test_history_keeps_only_the_newest() {
        let bus = InMemoryEventBus::with_history_limit(4, 3);
        for i in 0..10_000 {
            bus.publish(
                Event::new(kinds::DOCS_STALE, "guardian", Severity::Low)
                    .with_payload(serde_json::json!({ "n": i })),
            )
            .await
            .unwrap();
        }

        let history = bus.history().await;
        assert_eq!(history.len(), 3);
        let kept: Vec<i64> = history
            .iter()
            .filter_map(|e| e.payload["n"].as_i64())
            .collect();
        assert_eq!(kept, vec![9_997, 9_998, 9_999]);
    }

    #[tokio::test]
    async fn test_closed_bus_rejects() {
        let bus = InMemoryEventBus::default();
        bus.close();
        let err = bus
            .publish(Event::new(kinds::DOCS_STALE, "guardian", Severity::Low))
            .await
            .unwrap_err();
        assert_eq!(err, BusError::Closed);
    }

    #[tokio::test]
    async fn test_empty_type_rejected() {
        let bus = InMemoryEventBus::default();
        let err = bus
            .publish(Event::new("  ", "guardian", Severity::Low))
            .await
            .unwrap_err();
        assert!(matches!(err, BusError::Rejected(_)));
    }
}
