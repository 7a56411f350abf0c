//! Structured observability hooks for agent work.
//!
//! This module provides:
//! - Trace-scoped tracing spans via the `TraceSpan` RAII guard
//! - Emission functions for the dispatch and reasoning-loop lifecycle
//!
//! Events are emitted at `info!` level (filter with `RUST_LOG`).

use tracing::{info, warn};

/// RAII guard that enters a trace-scoped span for the duration of a task.
///
/// # Example
///
/// ```ignore
/// let _span = TraceSpan::enter("trace-12345", "CFO");
/// // every tracing call below carries trace_id = "trace-12345"
/// ```
pub struct TraceSpan {
    _span: tracing::span::EnteredSpan,
}

impl TraceSpan {
    /// Create and enter a span tagged with the trace id and agent name.
    pub fn enter(trace_id: &str, agent: &str) -> Self {
        let span = tracing::info_span!("aos.task", trace_id = %trace_id, agent = %agent);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: the loop started for an agent.
pub fn emit_loop_started(trace_id: &str, agent: &str, max_iterations: u32) {
    info!(
        event = "loop.started",
        trace_id = %trace_id,
        agent = %agent,
        max_iterations = max_iterations,
    );
}

/// Emit event: one completion call is about to be made.
pub fn emit_loop_iteration(trace_id: &str, agent: &str, iteration: u32) {
    info!(event = "loop.iteration", trace_id = %trace_id, agent = %agent, iteration = iteration);
}

/// Emit event: the loop returned.
pub fn emit_loop_finished(
    trace_id: &str,
    agent: &str,
    iterations: u32,
    tool_calls: usize,
    escalated: bool,
    duration_ms: u64,
) {
    info!(
        event = "loop.finished",
        trace_id = %trace_id,
        agent = %agent,
        iterations = iterations,
        tool_calls = tool_calls,
        escalated = escalated,
        duration_ms = duration_ms,
    );
}

/// Emit event: the completion service failed and the loop stopped.
pub fn emit_completion_failed(trace_id: &str, agent: &str, error: &dyn std::fmt::Display) {
    warn!(event = "loop.completion_failed", trace_id = %trace_id, agent = %agent, error = %error);
}

/// Emit event: a tool call did not succeed.
pub fn emit_tool_failed(trace_id: &str, tool: &str, error: &str) {
    warn!(event = "tool.failed", trace_id = %trace_id, tool = %tool, error = %error);
}

/// Emit event: a dispatch never reached the loop.
pub fn emit_dispatch_skipped(trace_id: &str, agent: &str, reason: &str) {
    warn!(event = "dispatch.skipped", trace_id = %trace_id, agent = %agent, reason = %reason);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_span_create() {
        let _span = TraceSpan::enter("trace-1", "CEO");
        emit_loop_iteration("trace-1", "CEO", 1);
    }
}
