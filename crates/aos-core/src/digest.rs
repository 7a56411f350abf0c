//! Ops digest: buffered outcome events, flushed as one grouped summary.
//!
//! Every flush takes an atomic snapshot of the buffer and clears it in the
//! same critical section, so each entry is emitted by exactly one digest.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::{kinds, Event, Severity};
use crate::events::{BusError, EventSink};
use crate::metrics::METRICS;

/// Source stamped on digest events.
pub const DIGEST_SOURCE: &str = "OpsDigest";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestCategory {
    AutoFixed,
    Recommendation,
    Escalation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestEntry {
    pub category: DigestCategory,
    pub agent: String,
    pub summary: String,
    pub event_id: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
}

/// Map a subscribed event to its digest entry. `None` for every other type.
pub fn entry_for(event: &Event) -> Option<DigestEntry> {
    let field = |key: &str| event.payload_str(key);
    let or = |value: Option<String>, fallback: &str| value.unwrap_or_else(|| fallback.to_string());

    let (category, agent, summary) = match event.event_type.as_str() {
        kinds::REPAIR_COMPLETED => (
            DigestCategory::AutoFixed,
            or(field("routedTo"), event.source.as_str()),
            format!(
                "Auto-fixed: {} on {}",
                or(field("action"), "unknown action"),
                or(field("originalType"), "unknown incident")
            ),
        ),
        kinds::AGENT_RETRAIN_NEEDED => (
            DigestCategory::Recommendation,
            or(field("agentName"), event.source.as_str()),
            format!(
                "Agent retraining recommended: {}",
                or(field("reason"), "accuracy drop")
            ),
        ),
        kinds::PROCESS_IMPROVEMENT_PROPOSAL => (
            DigestCategory::Recommendation,
            event.source.clone(),
            format!(
                "Process improvement: {}",
                or(field("proposal"), "see details")
            ),
        ),
        kinds::REPAIR_NEEDS_HUMAN => (
            DigestCategory::Escalation,
            or(field("routedTo"), event.source.as_str()),
            format!(
                "Human decision needed: {}",
                field("reason")
                    .or_else(|| field("action"))
                    .unwrap_or_else(|| "unspecified".to_string())
            ),
        ),
        kinds::WAR_ROOM_ACTIVATED => (
            DigestCategory::Escalation,
            "WarRoomManager".to_string(),
            format!("War room activated: {}", or(field("reason"), "unspecified")),
        ),
        kinds::DEPENDENCY_VULN_FOUND => (
            DigestCategory::Escalation,
            event.source.clone(),
            format!(
                "Vulnerability found in {}",
                or(field("serviceDir"), "unknown service")
            ),
        ),
        _ => return None,
    };

    Some(DigestEntry {
        category,
        agent,
        summary,
        event_id: event.id.clone(),
        event_type: event.event_type.clone(),
        timestamp: event.timestamp,
    })
}

/// Registry-derived counts reported with each digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestStats {
    pub agents_online: usize,
    pub agents_total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Digest {
    pub period: String,
    pub auto_fixed: Vec<DigestEntry>,
    pub recommendations: Vec<DigestEntry>,
    pub escalations: Vec<DigestEntry>,
    pub agents_online: usize,
    pub agents_total: usize,
    pub war_rooms_active: usize,
}

impl Digest {
    /// Group a buffer snapshot by category, preserving arrival order.
    pub fn from_entries(entries: Vec<DigestEntry>, window: Duration, stats: DigestStats) -> Self {
        let war_rooms_active = entries
            .iter()
            .filter(|e| e.event_type == kinds::WAR_ROOM_ACTIVATED)
            .count();

        let mut digest = Self {
            period: render_period(window),
            auto_fixed: Vec::new(),
            recommendations: Vec::new(),
            escalations: Vec::new(),
            agents_online: stats.agents_online,
            agents_total: stats.agents_total,
            war_rooms_active,
        };
        for entry in entries {
            match entry.category {
                DigestCategory::AutoFixed => digest.auto_fixed.push(entry),
                DigestCategory::Recommendation => digest.recommendations.push(entry),
                DigestCategory::Escalation => digest.escalations.push(entry),
            }
        }
        digest
    }

    pub fn severity(&self) -> Severity {
        if self.escalations.is_empty() {
            Severity::Low
        } else {
            Severity::High
        }
    }

    pub fn entry_count(&self) -> usize {
        self.auto_fixed.len() + self.recommendations.len() + self.escalations.len()
    }

    pub fn to_event(&self) -> Result<Event, serde_json::Error> {
        Ok(Event::new(kinds::OPS_DIGEST, DIGEST_SOURCE, self.severity())
            .with_payload(serde_json::to_value(self)?))
    }
}

/// Flush step as a pure function: the digest for `snapshot` plus the buffer
/// left behind, which is always empty.
pub fn flush(
    snapshot: Vec<DigestEntry>,
    window: Duration,
    stats: DigestStats,
) -> (Digest, Vec<DigestEntry>) {
    (Digest::from_entries(snapshot, window, stats), Vec::new())
}

/// `3600s` renders as `60min`; sub-minute remainders keep their fraction.
fn render_period(window: Duration) -> String {
    let secs = window.as_secs();
    if secs % 60 == 0 {
        format!("{}min", secs / 60)
    } else {
        format!("{}min", window.as_secs_f64() / 60.0)
    }
}

/// Buffers digest entries between flushes.
#[derive(Debug)]
pub struct DigestAggregator {
    window: Duration,
    entries: Mutex<Vec<DigestEntry>>,
}

impl DigestAggregator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Buffer `event` if it is a subscribed type. Returns whether it was kept.
    pub async fn ingest(&self, event: &Event) -> bool {
        match entry_for(event) {
            Some(entry) => {
                self.entries.lock().await.push(entry);
                true
            }
            None => false,
        }
    }

    pub async fn add_entry(&self, entry: DigestEntry) {
        self.entries.lock().await.push(entry);
    }

    /// Non-destructive view of the buffer.
    pub async fn pending(&self) -> Vec<DigestEntry> {
        self.entries.lock().await.clone()
    }

    /// Snapshot, clear and group the buffer without publishing.
    pub async fn take_digest(&self, stats: DigestStats) -> Digest {
        let snapshot = std::mem::take(&mut *self.entries.lock().await);
        let (digest, _cleared) = flush(snapshot, self.window, stats);
        digest
    }

    /// Flush and publish as an `OPS_DIGEST` event. If publication fails the
    /// snapshot is put back ahead of anything buffered meanwhile.
    pub async fn publish(
        &self,
        stats: DigestStats,
        sink: &dyn EventSink,
    ) -> Result<Digest, BusError> {
        let snapshot = std::mem::take(&mut *self.entries.lock().await);
        let (digest, _cleared) = flush(snapshot.clone(), self.window, stats);

        let published = match digest.to_event() {
            Ok(event) => sink.publish(event).await,
            Err(err) => Err(BusError::Rejected(err.to_string())),
        };

        if let Err(err) = published {
            warn!(event = "digest.publish_failed", error = %err, entries = digest.entry_count());
            self.restore(snapshot).await;
            return Err(err);
        }

        METRICS.inc_digests();
        info!(
            event = "digest.published",
            period = %digest.period,
            auto_fixed = digest.auto_fixed.len(),
            recommendations = digest.recommendations.len(),
            escalations = digest.escalations.len(),
        );
        Ok(digest)
    }

    /// Put `snapshot` back in arrival order, ahead of newer entries.
    async fn restore(&self, mut snapshot: Vec<DigestEntry>) {
        let mut entries = self.entries.lock().await;
        snapshot.append(&mut entries);
        *entries = snapshot;
    }
}
