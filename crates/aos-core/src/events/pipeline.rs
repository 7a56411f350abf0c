//! Feeds bus events through the self-repair router and the digest buffer.
//!
//! Each event is fully handled (buffered, classified, outcome published)
//! before the next one is taken. Outcome events come back through the bus
//! and are buffered on their own turn.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::warn;

use super::bus::{BusError, EventSink};
use crate::digest::DigestAggregator;
use crate::domain::Event;
use crate::self_repair::SelfRepairRouter;

pub struct OpsPipeline {
    router: SelfRepairRouter,
    digest: Arc<DigestAggregator>,
    sink: Arc<dyn EventSink>,
}

impl OpsPipeline {
    pub fn new(digest: Arc<DigestAggregator>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            router: SelfRepairRouter::new(),
            digest,
            sink,
        }
    }

    pub fn router(&self) -> &SelfRepairRouter {
        &self.router
    }

    pub fn digest(&self) -> &Arc<DigestAggregator> {
        &self.digest
    }

    /// Handle one event. Returns the repair outcome it produced, if any.
    pub async fn handle(&self, event: &Event) -> Result<Option<Event>, BusError> {
        self.digest.ingest(event).await;

        match self.router.handle(event) {
            Some(outcome) => {
                self.sink.publish(outcome.clone()).await?;
                Ok(Some(outcome))
            }
            None => Ok(None),
        }
    }

    /// Handle everything currently queued on `rx`, including outcomes
    /// published while draining. Returns the number of events handled.
    pub async fn drain(&self, rx: &mut broadcast::Receiver<Event>) -> Result<usize, BusError> {
        let mut handled = 0;
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    self.handle(&event).await?;
                    handled += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(event = "pipeline.lagged", skipped = skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        Ok(handled)
    }
}
