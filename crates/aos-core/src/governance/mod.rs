//! Launch governance: readiness reviews, decision aggregation and the
//! decision audit log.

pub mod assessors;
pub mod audit;
pub mod context;
pub mod engine;
pub mod pipeline;
pub mod review;

pub use assessors::{standard_panel, Ceo, ReadinessAssessor};
pub use audit::{DecisionLog, DecisionRecord, JsonlDecisionLog, MemoryDecisionLog};
pub use context::ReadinessContext;
pub use engine::{
    aggregate, DecisionOption, DecisionRule, GovernanceEngine, GovernanceThresholds,
    LaunchDecision,
};
pub use pipeline::run_launch_review;
pub use review::{derive_vote, Checklist, ConfidenceBands, LaunchVote, ReadinessReview};
