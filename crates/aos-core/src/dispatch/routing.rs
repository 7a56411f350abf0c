//! Keyword routing of free-text questions.

/// One row of the routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRule {
    pub agent: String,
    pub keywords: Vec<String>,
}

impl RoutingRule {
    pub fn new(agent: &str, keywords: &[&str]) -> Self {
        Self {
            agent: agent.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Keywords occurring as substrings of `lowered`.
    pub fn score(&self, lowered: &str) -> usize {
        self.keywords
            .iter()
            .filter(|k| lowered.contains(k.as_str()))
            .count()
    }
}

/// Ordered rules plus a fallback agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    rules: Vec<RoutingRule>,
    default_agent: String,
}

impl RoutingTable {
    pub fn new(rules: Vec<RoutingRule>, default_agent: impl Into<String>) -> Self {
        Self {
            rules,
            default_agent: default_agent.into(),
        }
    }

    /// The executive routing table, falling back to the CEO.
    pub fn standard() -> Self {
        Self::new(
            vec![
                RoutingRule::new(
                    "CFO",
                    &["revenue", "finance", "budget", "roi", "spend", "cost", "credit", "payment"],
                ),
                RoutingRule::new(
                    "CMO",
                    &["marketing", "campaign", "content", "brand", "invite", "growth"],
                ),
                RoutingRule::new(
                    "CRO",
                    &["sales", "lead", "crm", "pipeline", "follow-up", "prospect"],
                ),
                RoutingRule::new(
                    "COO",
                    &["operations", "order", "delivery", "sla", "logistics", "fulfillment"],
                ),
                RoutingRule::new("CPO", &["product", "feature", "roadmap", "ux", "design"]),
                RoutingRule::new(
                    "CTO",
                    &["engineering", "code", "deploy", "infrastructure", "api", "bug"],
                ),
                RoutingRule::new(
                    "HeadCustomer",
                    &["customer", "support", "complaint", "satisfaction", "feedback"],
                ),
                RoutingRule::new("CEO", &["strategy", "vision", "decision", "approve", "launch"]),
            ],
            "CEO",
        )
    }

    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    pub fn default_agent(&self) -> &str {
        &self.default_agent
    }

    /// Best-scoring agent for `text`. A later rule must strictly beat the
    /// best score so far, so the earliest rule wins ties. With no hits the
    /// default agent is returned.
    pub fn route(&self, text: &str) -> &str {
        let lowered = text.to_lowercase();
        let mut best = self.default_agent.as_str();
        let mut best_score = 0;
        for rule in &self.rules {
            let score = rule.score(&lowered);
            if score > best_score {
                best_score = score;
                best = rule.agent.as_str();
            }
        }
        best
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::standard()
    }
}
