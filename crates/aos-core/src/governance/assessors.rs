//! The executive readiness panel.
//!
//! Each assessor inspects its own slice of the [`ReadinessContext`] and
//! fills a [`Checklist`]. Vote and confidence always come from the shared
//! helpers in [`super::review`].

use std::sync::Arc;

use super::context::ReadinessContext;
use super::review::{Checklist, ConfidenceBands, ReadinessReview, SummaryTemplate};

/// Minimum loaded tools for the core engine to count as operational.
pub const MIN_TOOL_COUNT: u32 = 50;

/// Produces one review of the shared context. Must be pure.
pub trait ReadinessAssessor: Send + Sync {
    fn role(&self) -> &str;

    /// Agent name on the review. Defaults to the role.
    fn agent(&self) -> &str {
        self.role()
    }

    fn assess(&self, ctx: &ReadinessContext) -> ReadinessReview;
}

fn finish(
    assessor: &dyn ReadinessAssessor,
    checklist: Checklist,
    bands: ConfidenceBands,
    go: String,
    conditional: &'static str,
    no_go: &'static str,
) -> ReadinessReview {
    ReadinessReview::from_checklist(
        assessor.agent(),
        assessor.role(),
        checklist,
        bands,
        &SummaryTemplate {
            go,
            conditional,
            no_go,
        },
    )
}

fn languages(ctx: &ReadinessContext) -> String {
    ctx.campaign_template_languages.join(" + ")
}

/// Organisation-level readiness. Also the decision-maker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ceo;

impl ReadinessAssessor for Ceo {
    fn role(&self) -> &str {
        "CEO"
    }

    fn assess(&self, ctx: &ReadinessContext) -> ReadinessReview {
        let mut c = Checklist::new();

        if ctx.kill_switch {
            c.block("Kill switch is ON and halts everything");
        } else {
            c.pass("Kill switch disengaged");
        }

        if ctx.is_online() {
            c.pass("System online");
        } else {
            c.warn(format!("System status: {}", ctx.system_status));
        }

        if ctx.tool_count >= MIN_TOOL_COUNT && ctx.ai_keys_configured && ctx.semantic_router_active
        {
            c.pass("Core AI engine operational");
        } else {
            c.block("Core AI engine not fully operational");
        }

        if ctx.messaging_connector_configured && ctx.workspace_configured {
            c.pass("User-facing channels (messaging + workspace) ready");
        } else {
            c.block("User-facing channels not ready");
        }

        if ctx.draft_first_enforced {
            c.pass("Draft-first enforced");
        } else {
            c.block("Draft-first not enforced");
        }

        if ctx.campaign_profile_count >= 10 {
            c.pass("Campaign: 10 target users identified");
        } else {
            c.warn(format!(
                "Campaign: only {} profiles",
                ctx.campaign_profile_count
            ));
        }

        finish(
            self,
            c,
            ConfidenceBands::new(82, 15),
            "All systems go. Team ready, product solid, users identified.".to_string(),
            "Conditionally ready",
            "Not ready, fix blockers first",
        )
    }
}

/// Credits, payments and pricing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cfo;

impl ReadinessAssessor for Cfo {
    fn role(&self) -> &str {
        "CFO"
    }

    fn assess(&self, ctx: &ReadinessContext) -> ReadinessReview {
        let mut c = Checklist::new();

        if ctx.battery_depleted {
            c.block("AI credit battery depleted, users cannot be served");
        } else if ctx.battery_remaining < 3.0 {
            c.warn(format!(
                "Battery low: {}/{} credits",
                ctx.battery_remaining, ctx.battery_daily_limit
            ));
        } else {
            c.pass(format!(
                "AI credit battery healthy: {}/{} credits",
                ctx.battery_remaining, ctx.battery_daily_limit
            ));
        }

        if ctx.webhook_crypto_enabled {
            c.pass("Payment webhook signatures verified");
        } else {
            c.warn("Payment webhook signing not configured");
        }

        if ctx.pricing_tiers_defined < 2 {
            c.block("At least 2 pricing tiers are needed for a free-to-paid path");
        } else {
            c.pass(format!("{} pricing tiers defined", ctx.pricing_tiers_defined));
        }

        if ctx.free_to_paid_path_defined {
            c.pass("Free-to-paid conversion path defined");
        } else {
            c.warn("Free-to-paid conversion path not fully wired");
        }

        finish(
            self,
            c,
            ConfidenceBands::new(75, 25),
            "Financials clear. Battery funded, payments wired, pricing set.".to_string(),
            "Budget acceptable with caveats",
            "Financial blockers",
        )
    }
}

/// Runtime, keys, tools and security plumbing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cto;

impl ReadinessAssessor for Cto {
    fn role(&self) -> &str {
        "CTO"
    }

    fn assess(&self, ctx: &ReadinessContext) -> ReadinessReview {
        let mut c = Checklist::new();

        if ctx.kill_switch {
            c.block("Kill switch is ON and all AI execution is halted");
        } else {
            c.pass("Kill switch disengaged");
        }

        if ctx.is_online() {
            c.pass("System status: online");
        } else if ctx.is_degraded() {
            c.warn("System in degraded mode");
        } else {
            c.block(format!("System status: {}", ctx.system_status));
        }

        if ctx.ai_keys_configured {
            c.pass("AI API keys configured");
        } else {
            c.block("No AI API keys, the semantic router will fail");
        }

        if ctx.tool_count < MIN_TOOL_COUNT {
            c.block(format!(
                "Only {} tools loaded, expected at least {MIN_TOOL_COUNT}",
                ctx.tool_count
            ));
        } else {
            c.pass(format!("{} tools loaded", ctx.tool_count));
        }

        if ctx.jwt_auth_enabled {
            c.pass("JWT authentication enabled");
        } else {
            c.warn("JWT auth not enabled");
        }

        if ctx.rate_limiting_enabled {
            c.pass("Rate limiting active");
        } else {
            c.warn("Rate limiting not enabled");
        }

        if !ctx.services_down.is_empty() {
            c.warn(format!("Services down: {}", ctx.services_down.join(", ")));
        }
        if !ctx.services_healthy.is_empty() {
            c.pass(format!("{} services healthy", ctx.services_healthy.len()));
        }

        if ctx.messaging_connector_configured {
            c.pass("Messaging connector configured");
        } else {
            c.block("Messaging connector not configured");
        }

        if ctx.semantic_router_active {
            c.pass("Semantic router active");
        } else {
            c.block("Semantic router inactive");
        }

        finish(
            self,
            c,
            ConfidenceBands::new(78, 20),
            format!(
                "Infrastructure solid. {} tools, AI wired, all systems online.",
                ctx.tool_count
            ),
            "Tech ready with caveats",
            "Tech blockers",
        )
    }
}

/// Campaign audience and outreach channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cmo;

impl ReadinessAssessor for Cmo {
    fn role(&self) -> &str {
        "CMO"
    }

    fn assess(&self, ctx: &ReadinessContext) -> ReadinessReview {
        let mut c = Checklist::new();

        if ctx.campaign_profile_count < 10 {
            c.warn(format!(
                "Only {} campaign profiles, target is 10",
                ctx.campaign_profile_count
            ));
        } else {
            c.pass(format!(
                "{} campaign profiles ready",
                ctx.campaign_profile_count
            ));
        }

        if ctx.campaign_template_languages.len() < 2 {
            c.warn("Templates in fewer than 2 languages");
        } else {
            c.pass(format!("Templates in {}", languages(ctx)));
        }

        if ctx.draft_first_enforced {
            c.pass("Draft-first enforced, every message needs approval");
        } else {
            c.block("Draft-first not enforced, campaigns would skip the approval gate");
        }

        if ctx.messaging_connector_configured {
            c.pass("Messaging connector online for campaign delivery");
        } else {
            c.block("Messaging connector offline, primary outreach channel unavailable");
        }

        c.pass("3-touch campaign strategy defined");
        c.pass("Organic outreach before paid");

        finish(
            self,
            c,
            ConfidenceBands::new(75, 25),
            "Campaign ready. Profiles, touch strategy and templates in place.".to_string(),
            "Campaign mostly ready",
            "Campaign blockers",
        )
    }
}

/// Workspace persistence, outbound channels and cadence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coo;

impl ReadinessAssessor for Coo {
    fn role(&self) -> &str {
        "COO"
    }

    fn assess(&self, ctx: &ReadinessContext) -> ReadinessReview {
        let mut c = Checklist::new();

        if ctx.workspace_configured {
            c.pass("Workspace configured for persistence");
        } else {
            c.block("Workspace not configured, record updates will fail");
        }

        if ctx.messaging_connector_configured {
            c.pass("Messaging connector online");
        } else {
            c.block("Messaging connector offline");
        }

        if ctx.cadence_engine_enabled {
            c.pass("Cadence engine enabled");
        } else {
            c.warn("Cadence engine disabled, automated reports will not send");
        }

        if ctx.draft_first_enforced {
            c.pass("Draft-first enforced on all outbound channels");
        } else {
            c.block("Draft-first not enforced, messages could send without approval");
        }

        finish(
            self,
            c,
            ConfidenceBands::new(80, 25),
            "Operations ready. Workspace, messaging and cadence all go.".to_string(),
            "Ops mostly ready",
            "Operational blockers",
        )
    }
}

/// Product capability and activation funnel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cpo;

impl ReadinessAssessor for Cpo {
    fn role(&self) -> &str {
        "CPO"
    }

    fn assess(&self, ctx: &ReadinessContext) -> ReadinessReview {
        let mut c = Checklist::new();

        if ctx.tool_count < MIN_TOOL_COUNT {
            c.block(format!(
                "Only {} tools, users will not get the full experience",
                ctx.tool_count
            ));
        } else {
            c.pass(format!("{} tools loaded, full product capability", ctx.tool_count));
        }

        if ctx.activation_target_minutes > 10 {
            c.warn(format!(
                "Activation target: {} min (should be under 10)",
                ctx.activation_target_minutes
            ));
        } else {
            c.pass(format!(
                "Activation target: under {} min",
                ctx.activation_target_minutes
            ));
        }

        if ctx.funnel_stages_defined < 5 {
            c.warn(format!(
                "Only {} funnel stages, full journey tracking needs 5",
                ctx.funnel_stages_defined
            ));
        } else {
            c.pass(format!("{} funnel stages defined", ctx.funnel_stages_defined));
        }

        if ctx.semantic_router_active {
            c.pass("Semantic router active");
        } else {
            c.block("Semantic router inactive, no AI interactions");
        }

        if ctx.campaign_template_languages.len() < 2 {
            c.warn("Campaign templates in fewer than 2 languages");
        } else {
            c.pass(format!("Templates in {}", languages(ctx)));
        }

        finish(
            self,
            c,
            ConfidenceBands::new(72, 25),
            format!(
                "Product ready. {} tools, under {} min activation, multilingual.",
                ctx.tool_count, ctx.activation_target_minutes
            ),
            "Product mostly ready",
            "Product blockers",
        )
    }
}

/// Help channels and self-service. There is no dedicated support queue,
/// so this review is never better than conditional.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadCustomer;

impl ReadinessAssessor for HeadCustomer {
    fn role(&self) -> &str {
        "HeadCustomer"
    }

    fn assess(&self, ctx: &ReadinessContext) -> ReadinessReview {
        let mut c = Checklist::new();

        if ctx.semantic_router_active {
            c.pass("Natural-language help active");
        } else {
            c.block("No AI, users cannot ask questions in natural language");
        }

        if ctx.messaging_connector_configured {
            c.pass("Messaging support channel configured");
        } else {
            c.block("Messaging support channel offline");
        }

        if ctx.workspace_configured {
            c.pass("Workspace operational for self-service");
        } else {
            c.block("Workspace offline, no self-service capability");
        }

        c.pass("Help command lists every capability");
        c.pass("Errors fall back to a retry hint");
        c.warn("No dedicated support queue, the founder handles all escalations");

        finish(
            self,
            c,
            ConfidenceBands::new(70, 20),
            "Customer support ready. Help system active, support channel live.".to_string(),
            "Support mostly ready",
            "Support blockers",
        )
    }
}

/// Build health and deployability. Carries two standing test-coverage
/// warnings, so the best outcome is conditional.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadEngineering;

impl ReadinessAssessor for HeadEngineering {
    fn role(&self) -> &str {
        "HeadEngineering"
    }

    fn assess(&self, ctx: &ReadinessContext) -> ReadinessReview {
        let mut c = Checklist::new();

        if ctx.is_online() {
            c.pass("System boots and serves requests");
        } else if ctx.is_degraded() {
            c.warn("System in degraded mode with limited capability");
        } else {
            c.block(format!("System not operational: {}", ctx.system_status));
        }

        if ctx.tool_count >= MIN_TOOL_COUNT {
            c.pass(format!("Build successful, {} tool modules loaded", ctx.tool_count));
        } else {
            c.block(format!("Build issue, only {} tools loaded", ctx.tool_count));
        }

        if !ctx.services_healthy.is_empty() {
            c.pass(format!(
                "{} services with deployment configs",
                ctx.services_healthy.len()
            ));
        }

        c.pass("CI runs typecheck, lint and test on every push");
        c.warn("Most test files are placeholder stubs");
        c.warn("Integration coverage needed for the gateway auth flow");

        finish(
            self,
            c,
            ConfidenceBands::new(70, 20),
            "Engineering: builds pass, deploys work.".to_string(),
            "Engineering ready with caveats",
            "Engineering blockers",
        )
    }
}

/// Safety controls and abuse protection.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadIntelligenceRisk;

impl ReadinessAssessor for HeadIntelligenceRisk {
    fn role(&self) -> &str {
        "HeadIntelligenceRisk"
    }

    fn assess(&self, ctx: &ReadinessContext) -> ReadinessReview {
        let mut c = Checklist::new();

        if ctx.kill_switch {
            c.block("Kill switch engaged, cannot launch while halted");
        } else {
            c.pass("Kill switch functional and disengaged");
        }

        if ctx.rate_limiting_enabled {
            c.pass("Rate limiting active");
        } else {
            c.warn("Rate limiting not enabled, abuse risk");
        }

        if ctx.jwt_auth_enabled {
            c.pass("JWT auth enabled, tenant data isolated");
        } else {
            c.warn("JWT auth not enabled, multi-tenant data risk");
        }

        if ctx.webhook_crypto_enabled {
            c.pass("Webhook signatures verified");
        } else {
            c.warn("Webhook signing not configured, payment integrity risk");
        }

        if ctx.draft_first_enforced {
            c.pass("Draft-first enforced, no unsupervised outbound messages");
        } else {
            c.block("Draft-first not enforced, rogue message risk");
        }

        if !ctx.battery_depleted && ctx.battery_daily_limit > 0.0 {
            c.pass(format!(
                "AI credit battery capped at {} credits/day",
                ctx.battery_daily_limit
            ));
        } else {
            c.warn("AI credit battery depleted or uncapped");
        }

        c.pass("Agents are advisory only, deploy execution is forbidden");

        finish(
            self,
            c,
            ConfidenceBands::new(72, 15),
            "Security posture acceptable. Kill switch, rate limiting, draft-first and battery cap active."
                .to_string(),
            "Security mostly ready",
            "Security blockers",
        )
    }
}

/// Every assessor except the decision-maker, in review order.
pub fn standard_panel() -> Vec<Arc<dyn ReadinessAssessor>> {
    vec![
        Arc::new(Cfo),
        Arc::new(Cto),
        Arc::new(Cmo),
        Arc::new(Coo),
        Arc::new(Cpo),
        Arc::new(HeadCustomer),
        Arc::new(HeadEngineering),
        Arc::new(HeadIntelligenceRisk),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::review::LaunchVote;

    fn ready() -> ReadinessContext {
        ReadinessContext {
            kill_switch: false,
            tool_count: 68,
            system_status: "online".into(),
            ai_keys_configured: true,
            battery_remaining: 10.0,
            battery_daily_limit: 10.0,
            battery_depleted: false,
            services_healthy: vec!["gateway".into(), "workspace".into()],
            services_down: vec![],
            campaign_profile_count: 10,
            campaign_template_languages: vec!["es".into(), "en".into()],
            draft_first_enforced: true,
            webhook_crypto_enabled: true,
            rate_limiting_enabled: true,
            jwt_auth_enabled: true,
            semantic_router_active: true,
            messaging_connector_configured: true,
            workspace_configured: true,
            cadence_engine_enabled: true,
            funnel_stages_defined: 10,
            activation_target_minutes: 10,
            pricing_tiers_defined: 3,
            free_to_paid_path_defined: true,
        }
    }

    #[test]
    fn test_ready_context_votes() {
        let ctx = ready();
        let mut panel = standard_panel();
        panel.push(Arc::new(Ceo));
        for assessor in panel {
            let review = assessor.assess(&ctx);
            let expected = match assessor.role() {
                "HeadCustomer" | "HeadEngineering" => LaunchVote::Conditional,
                _ => LaunchVote::Go,
            };
            assert_eq!(review.vote, expected, "{}", review.role);
            assert!(review.validate().is_ok());
        }
    }

    #[test]
    fn test_go_review_confidence() {
        let review = Cfo.assess(&ready());
        assert_eq!(review.vote, LaunchVote::Go);
        assert_eq!(review.confidence, 95);
        assert!(review.blockers.is_empty() && review.warnings.is_empty());
    }

    #[test]
    fn test_cfo_low_battery_warns() {
        let ctx = ReadinessContext {
            battery_remaining: 2.0,
            ..ready()
        };
        let review = Cfo.assess(&ctx);
        assert_eq!(review.vote, LaunchVote::Conditional);
        assert_eq!(review.warnings, vec!["Battery low: 2/10 credits".to_string()]);
        assert!((70..=85).contains(&review.confidence));
    }

    #[test]
    fn test_cto_degraded_is_warning_offline_is_blocker() {
        let degraded = ReadinessContext {
            system_status: "degraded".into(),
            ..ready()
        };
        assert_eq!(Cto.assess(&degraded).vote, LaunchVote::Conditional);

        let booting = ReadinessContext {
            system_status: "booting".into(),
            ..ready()
        };
        let review = Cto.assess(&booting);
        assert_eq!(review.vote, LaunchVote::NoGo);
        assert_eq!(review.blockers, vec!["System status: booting".to_string()]);
        assert!((15..=25).contains(&review.confidence));
    }

    #[test]
    fn test_kill_switch_blocks_safety_roles() {
        let ctx = ReadinessContext {
            kill_switch: true,
            ..ready()
        };
        assert_eq!(Ceo.assess(&ctx).vote, LaunchVote::NoGo);
        assert_eq!(Cto.assess(&ctx).vote, LaunchVote::NoGo);
        assert_eq!(HeadIntelligenceRisk.assess(&ctx).vote, LaunchVote::NoGo);
        // Not every role looks at the switch.
        assert_eq!(Cfo.assess(&ctx).vote, LaunchVote::Go);
    }

    #[test]
    fn test_cpo_funnel_and_summary() {
        let ctx = ReadinessContext {
            funnel_stages_defined: 3,
            ..ready()
        };
        let review = Cpo.assess(&ctx);
        assert_eq!(
            review.summary,
            "Product mostly ready: Only 3 funnel stages, full journey tracking needs 5"
        );
    }
}
