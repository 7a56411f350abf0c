//! Global atomic counters for the AOS runtime.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. on every digest tick).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters. No allocations, no locking.
pub struct Metrics {
    dispatches: AtomicU64,
    loop_iterations: AtomicU64,
    tool_calls: AtomicU64,
    tool_failures: AtomicU64,
    repairs: AtomicU64,
    digests_published: AtomicU64,
    governance_passes: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            dispatches: AtomicU64::new(0),
            loop_iterations: AtomicU64::new(0),
            tool_calls: AtomicU64::new(0),
            tool_failures: AtomicU64::new(0),
            repairs: AtomicU64::new(0),
            digests_published: AtomicU64::new(0),
            governance_passes: AtomicU64::new(0),
        }
    }

    pub fn inc_dispatches(&self) {
        self.dispatches.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "dispatches", "counter incremented");
    }

    pub fn inc_loop_iterations(&self) {
        self.loop_iterations.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "loop_iterations", "counter incremented");
    }

    pub fn inc_tool_calls(&self) {
        self.tool_calls.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "tool_calls", "counter incremented");
    }

    pub fn inc_tool_failures(&self) {
        self.tool_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "tool_failures", "counter incremented");
    }

    pub fn inc_repairs(&self) {
        self.repairs.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "repairs", "counter incremented");
    }

    pub fn inc_digests(&self) {
        self.digests_published.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "digests_published", "counter incremented");
    }

    pub fn inc_governance_passes(&self) {
        self.governance_passes.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "governance_passes", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    ///
    /// Call this at natural boundaries (daemon tick, shutdown) rather than
    /// on every increment.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            dispatches = self.dispatches(),
            loop_iterations = self.loop_iterations(),
            tool_calls = self.tool_calls(),
            tool_failures = self.tool_failures(),
            repairs = self.repairs(),
            digests_published = self.digests_published(),
            governance_passes = self.governance_passes(),
        );
    }

    pub fn dispatches(&self) -> u64 {
        self.dispatches.load(Ordering::Relaxed)
    }

    pub fn loop_iterations(&self) -> u64 {
        self.loop_iterations.load(Ordering::Relaxed)
    }

    pub fn tool_calls(&self) -> u64 {
        self.tool_calls.load(Ordering::Relaxed)
    }

    pub fn tool_failures(&self) -> u64 {
        self.tool_failures.load(Ordering::Relaxed)
    }

    pub fn repairs(&self) -> u64 {
        self.repairs.load(Ordering::Relaxed)
    }

    pub fn digests_published(&self) -> u64 {
        self.digests_published.load(Ordering::Relaxed)
    }

    pub fn governance_passes(&self) -> u64 {
        self.governance_passes.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        for counter in [
            &self.dispatches,
            &self.loop_iterations,
            &self.tool_calls,
            &self.tool_failures,
            &self.repairs,
            &self.digests_published,
            &self.governance_passes,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
