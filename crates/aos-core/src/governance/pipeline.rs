//! The full launch review: announce, collect, decide, publish.

use std::sync::Arc;

use serde_json::json;
use tracing::instrument;

use super::assessors::ReadinessAssessor;
use super::context::ReadinessContext;
use super::engine::{GovernanceEngine, LaunchDecision};
use super::review::LaunchVote;
use crate::domain::{kinds, Event, Result, Severity};
use crate::events::EventSink;

pub const PIPELINE_SOURCE: &str = "LaunchPipeline";

/// Run every panel assessor, let `decision_maker` decide and publish the
/// outcome. Bus and log failures abort the review.
#[instrument(skip_all, fields(reviewers = panel.len(), decided_by = %decision_maker.agent()))]
pub async fn run_launch_review(
    ctx: &ReadinessContext,
    panel: &[Arc<dyn ReadinessAssessor>],
    decision_maker: &dyn ReadinessAssessor,
    engine: &GovernanceEngine,
    sink: &dyn EventSink,
) -> Result<LaunchDecision> {
    sink.publish(
        Event::new(kinds::LAUNCH_REVIEW_REQUESTED, PIPELINE_SOURCE, Severity::Critical)
            .with_payload(json!({
                "decisionKey": engine.decision_key(),
                "reviewers": panel.len() + 1,
            })),
    )
    .await?;

    let reviews: Vec<_> = panel.iter().map(|a| a.assess(ctx)).collect();

    for review in &reviews {
        let severity = if review.vote == LaunchVote::NoGo {
            Severity::Critical
        } else {
            Severity::Low
        };
        sink.publish(
            Event::new(kinds::LAUNCH_REVIEW_SUBMITTED, review.agent.as_str(), severity)
                .with_payload(json!({
                    "role": review.role,
                    "vote": review.vote,
                    "confidence": review.confidence,
                    "summary": review.summary,
                })),
        )
        .await?;
    }

    let decision = engine.decide(ctx, reviews, decision_maker).await?;

    let outcome = if decision.approved {
        kinds::LAUNCH_APPROVED
    } else {
        kinds::LAUNCH_BLOCKED
    };
    sink.publish(
        Event::new(outcome, decision.decided_by.as_str(), Severity::Critical).with_payload(
            json!({
                "approved": decision.approved,
                "rule": decision.rule,
                "totalGo": decision.total_go,
                "totalNoGo": decision.total_no_go,
                "totalConditional": decision.total_conditional,
                "blockers": decision.blockers,
                "summary": decision.summary,
            }),
        ),
    )
    .await?;

    Ok(decision)
}
