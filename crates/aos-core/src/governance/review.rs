//! Readiness reviews and the vote rule every assessor shares.

use serde::{Deserialize, Serialize};

/// One assessor's launch vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaunchVote {
    Go,
    Conditional,
    NoGo,
}

impl LaunchVote {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::Conditional => "conditional",
            Self::NoGo => "no-go",
        }
    }
}

impl std::fmt::Display for LaunchVote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any blocker means no-go; otherwise any warning means conditional.
pub fn derive_vote(blockers: &[String], warnings: &[String]) -> LaunchVote {
    if !blockers.is_empty() {
        LaunchVote::NoGo
    } else if !warnings.is_empty() {
        LaunchVote::Conditional
    } else {
        LaunchVote::Go
    }
}

/// Confidence reported for each vote. Values are clamped into the shared
/// bands: 95 for go, 70..=85 for conditional, 15..=25 for no-go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfidenceBands {
    pub conditional: u8,
    pub no_go: u8,
}

impl ConfidenceBands {
    pub const GO: u8 = 95;

    pub const fn new(conditional: u8, no_go: u8) -> Self {
        Self {
            conditional,
            no_go,
        }
    }

    pub fn confidence(&self, vote: LaunchVote) -> u8 {
        match vote {
            LaunchVote::Go => Self::GO,
            LaunchVote::Conditional => self.conditional.clamp(70, 85),
            LaunchVote::NoGo => self.no_go.clamp(15, 25),
        }
    }
}

impl Default for ConfidenceBands {
    fn default() -> Self {
        Self::new(80, 20)
    }
}

/// Findings gathered by one assessor before the vote is derived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checklist {
    pub blockers: Vec<String>,
    pub warnings: Vec<String>,
    pub passed: Vec<String>,
}

impl Checklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(&mut self, finding: impl Into<String>) {
        self.blockers.push(finding.into());
    }

    pub fn warn(&mut self, finding: impl Into<String>) {
        self.warnings.push(finding.into());
    }

    pub fn pass(&mut self, finding: impl Into<String>) {
        self.passed.push(finding.into());
    }

    pub fn vote(&self) -> LaunchVote {
        derive_vote(&self.blockers, &self.warnings)
    }
}

/// Summary lines for each vote. Conditional and no-go summaries append the
/// warnings or blockers joined with "; ".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTemplate {
    pub go: String,
    pub conditional: &'static str,
    pub no_go: &'static str,
}

impl SummaryTemplate {
    fn render(&self, vote: LaunchVote, checklist: &Checklist) -> String {
        match vote {
            LaunchVote::Go => self.go.clone(),
            LaunchVote::Conditional => {
                format!("{}: {}", self.conditional, checklist.warnings.join("; "))
            }
            LaunchVote::NoGo => format!("{}: {}", self.no_go, checklist.blockers.join("; ")),
        }
    }
}

/// One assessor's verdict on the shared readiness context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReview {
    pub agent: String,
    pub role: String,
    pub vote: LaunchVote,
    pub confidence: u8,
    pub blockers: Vec<String>,
    pub warnings: Vec<String>,
    pub passed: Vec<String>,
    pub summary: String,
}

impl ReadinessReview {
    /// Derive vote, confidence and summary from a finished checklist.
    pub fn from_checklist(
        agent: impl Into<String>,
        role: impl Into<String>,
        checklist: Checklist,
        bands: ConfidenceBands,
        summary: &SummaryTemplate,
    ) -> Self {
        let vote = checklist.vote();
        let summary = summary.render(vote, &checklist);
        Self {
            agent: agent.into(),
            role: role.into(),
            vote,
            confidence: bands.confidence(vote),
            blockers: checklist.blockers,
            warnings: checklist.warnings,
            passed: checklist.passed,
            summary,
        }
    }

    /// The vote must match the shared rule and confidence must be a percentage.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let expected = derive_vote(&self.blockers, &self.warnings);
        if self.vote != expected {
            return Err(format!(
                "{} voted {} but its findings derive {}",
                self.role, self.vote, expected
            ));
        }
        if self.confidence > 100 {
            return Err(format!(
                "{} reported confidence {} above 100",
                self.role, self.confidence
            ));
        }
        Ok(())
    }
}
