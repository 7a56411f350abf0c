//! Launch decision aggregation.
//!
//! [`aggregate`] is a pure function of its inputs. [`GovernanceEngine`]
//! adds the decision-maker's own review, validates the panel and appends
//! the result to the decision log.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::assessors::ReadinessAssessor;
use super::audit::{DecisionLog, DecisionRecord};
use super::context::ReadinessContext;
use super::review::{LaunchVote, ReadinessReview};
use crate::config::GovernanceConfig;
use crate::domain::{AosError, Result};
use crate::metrics::METRICS;

/// Consensus thresholds. Tuned for a ten-reviewer panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceThresholds {
    pub high_consensus_go: usize,
    pub majority_positive: usize,
    pub max_conditional: usize,
}

impl Default for GovernanceThresholds {
    fn default() -> Self {
        Self::from(&GovernanceConfig::default())
    }
}

impl From<&GovernanceConfig> for GovernanceThresholds {
    fn from(config: &GovernanceConfig) -> Self {
        Self {
            high_consensus_go: config.high_consensus_go,
            majority_positive: config.majority_positive,
            max_conditional: config.max_conditional,
        }
    }
}

/// The rule that decided a launch, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    KillSwitch,
    NoGoVeto,
    HighConsensus,
    ConditionalMajority,
    InsufficientConsensus,
}

impl DecisionRule {
    pub fn approves(&self) -> bool {
        matches!(self, Self::HighConsensus | Self::ConditionalMajority)
    }

    pub fn chosen_option(&self) -> DecisionOption {
        match self {
            Self::HighConsensus => DecisionOption::Approve,
            Self::ConditionalMajority => DecisionOption::Conditional,
            Self::KillSwitch | Self::NoGoVeto | Self::InsufficientConsensus => {
                DecisionOption::Block
            }
        }
    }
}

/// The fixed option set a launch decision is recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOption {
    Approve,
    Block,
    Conditional,
}

impl DecisionOption {
    pub const ALL: [DecisionOption; 3] = [Self::Approve, Self::Block, Self::Conditional];
}

/// Outcome of one governance pass. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchDecision {
    pub approved: bool,
    pub decided_by: String,
    pub timestamp: DateTime<Utc>,
    pub reviews: Vec<ReadinessReview>,
    pub total_go: usize,
    pub total_no_go: usize,
    pub total_conditional: usize,
    /// `[Role] blocker`, in review order then finding order.
    pub blockers: Vec<String>,
    pub summary: String,
    pub rule: DecisionRule,
}

impl LaunchDecision {
    /// Mean confidence over every review, rounded to the nearest integer.
    pub fn mean_confidence(&self) -> u32 {
        mean_confidence(&self.reviews)
    }
}

fn mean_confidence(reviews: &[ReadinessReview]) -> u32 {
    if reviews.is_empty() {
        return 0;
    }
    let total: u32 = reviews.iter().map(|r| u32::from(r.confidence)).sum();
    (f64::from(total) / reviews.len() as f64).round() as u32
}

fn roles_with(reviews: &[ReadinessReview], vote: LaunchVote) -> impl Iterator<Item = &ReadinessReview> {
    reviews.iter().filter(move |r| r.vote == vote)
}

fn bullets(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| format!("  • {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Apply the decision rules to a complete review set.
///
/// The kill switch is checked first and overrides every tally.
pub fn aggregate(
    kill_switch: bool,
    reviews: Vec<ReadinessReview>,
    thresholds: &GovernanceThresholds,
    decided_by: &str,
) -> LaunchDecision {
    let tally = |vote: LaunchVote| roles_with(&reviews, vote).count();
    let total_go = tally(LaunchVote::Go);
    let total_no_go = tally(LaunchVote::NoGo);
    let total_conditional = tally(LaunchVote::Conditional);

    let blockers: Vec<String> = reviews
        .iter()
        .flat_map(|r| r.blockers.iter().map(move |b| format!("[{}] {b}", r.role)))
        .collect();

    let (rule, summary) = if kill_switch {
        (
            DecisionRule::KillSwitch,
            "BLOCKED: Kill switch is ON. Disengage before launch.".to_string(),
        )
    } else if total_no_go > 0 {
        let no_go_roles: Vec<&str> = roles_with(&reviews, LaunchVote::NoGo)
            .map(|r| r.role.as_str())
            .collect();
        (
            DecisionRule::NoGoVeto,
            format!(
                "BLOCKED by {}. {} blocker(s) must be resolved.\n\nBlockers:\n{}",
                no_go_roles.join(", "),
                blockers.len(),
                bullets(&blockers)
            ),
        )
    } else if total_go >= thresholds.high_consensus_go {
        (
            DecisionRule::HighConsensus,
            format!(
                "APPROVED. {total_go} GO votes, {total_conditional} conditional. \
                 Team consensus: ship it.\n\nAvg confidence: {}%",
                mean_confidence(&reviews)
            ),
        )
    } else if total_go + total_conditional >= thresholds.majority_positive
        && total_conditional <= thresholds.max_conditional
    {
        let conditions: Vec<String> = roles_with(&reviews, LaunchVote::Conditional)
            .flat_map(|r| r.warnings.iter().map(move |w| format!("[{}] {w}", r.role)))
            .collect();
        (
            DecisionRule::ConditionalMajority,
            format!(
                "APPROVED WITH CONDITIONS. {total_go} GO, {total_conditional} conditional.\n\n\
                 Conditions to address post-launch:\n{}",
                bullets(&conditions)
            ),
        )
    } else {
        (
            DecisionRule::InsufficientConsensus,
            format!(
                "NOT APPROVED. Only {total_go} GO votes out of {}. Need stronger consensus.",
                reviews.len()
            ),
        )
    };

    LaunchDecision {
        approved: rule.approves(),
        decided_by: decided_by.to_string(),
        timestamp: Utc::now(),
        reviews,
        total_go,
        total_no_go,
        total_conditional,
        blockers,
        summary,
        rule,
    }
}

/// Runs governance passes and records each decision.
pub struct GovernanceEngine {
    thresholds: GovernanceThresholds,
    decision_key: String,
    log: Arc<dyn DecisionLog>,
}

impl GovernanceEngine {
    pub fn new(config: &GovernanceConfig, log: Arc<dyn DecisionLog>) -> Self {
        Self {
            thresholds: GovernanceThresholds::from(config),
            decision_key: config.decision_key.clone(),
            log,
        }
    }

    pub fn thresholds(&self) -> &GovernanceThresholds {
        &self.thresholds
    }

    pub fn decision_key(&self) -> &str {
        &self.decision_key
    }

    pub fn log(&self) -> &Arc<dyn DecisionLog> {
        &self.log
    }

    /// Add the decision-maker's review to `reviews`, aggregate and log.
    ///
    /// Fails with [`AosError::InvalidReview`] when a review's vote does not
    /// follow from its findings, and with the log's error if the append fails.
    #[instrument(skip_all, fields(decided_by = %decision_maker.agent(), reviews = reviews.len()))]
    pub async fn decide(
        &self,
        ctx: &ReadinessContext,
        mut reviews: Vec<ReadinessReview>,
        decision_maker: &dyn ReadinessAssessor,
    ) -> Result<LaunchDecision> {
        for review in &reviews {
            review.validate().map_err(AosError::InvalidReview)?;
        }
        reviews.push(decision_maker.assess(ctx));

        let decision = aggregate(
            ctx.kill_switch,
            reviews,
            &self.thresholds,
            decision_maker.agent(),
        );
        METRICS.inc_governance_passes();
        info!(
            event = "governance.decided",
            approved = decision.approved,
            rule = ?decision.rule,
            go = decision.total_go,
            conditional = decision.total_conditional,
            no_go = decision.total_no_go,
        );

        self.log
            .log_decision(DecisionRecord::new(&self.decision_key, &decision))
            .await?;
        Ok(decision)
    }
}
