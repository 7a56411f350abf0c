use std::sync::Arc;

use aos_core::digest::DigestAggregator;
use aos_core::self_repair::{classify_incident, ROUTER_SOURCE};
use aos_core::{
    kinds, Event, EventSink, InMemoryEventBus, OpsPipeline, RepairCategory, SelfRepairRouter,
    Severity,
};
use serde_json::json;

#[test]
fn autonomous_action_is_low_severity_auto_fix() {
    let router = SelfRepairRouter::new();
    let incident = Event::new(kinds::DEPLOY_FAILED, "guardian", Severity::High)
        .with_payload(json!({"service": "gateway"}));

    let outcome = router.handle(&incident).expect("routed");

    assert_eq!(outcome.event_type, kinds::REPAIR_COMPLETED);
    assert_eq!(outcome.severity, Severity::Low);
    assert_eq!(outcome.source, ROUTER_SOURCE);
    assert_eq!(outcome.payload["autonomous"], true);
    assert_eq!(outcome.payload["action"], "retry_deploy");
    assert_eq!(outcome.payload["routedTo"], "PipelineEng");
    assert_eq!(outcome.payload["team"], "devops-ci");
    assert_eq!(outcome.payload["originalEvent"], incident.id.as_str());
    assert!(outcome.payload.get("reason").is_none());
    assert_eq!(router.total_repairs(), 1);
}

#[test]
fn human_required_action_is_high_severity_escalation() {
    let router = SelfRepairRouter::new();
    let incident = Event::new(kinds::BATTERY_BURN_ANOMALY, "finance", Severity::Medium);

    let outcome = router.handle(&incident).expect("routed");

    assert_eq!(outcome.event_type, kinds::REPAIR_NEEDS_HUMAN);
    assert_eq!(outcome.severity, Severity::High);
    assert_eq!(outcome.payload["autonomous"], false);
    assert_eq!(
        outcome.payload["reason"],
        "Action 'change_battery_limits' requires human approval"
    );
    assert_eq!(router.total_repairs(), 1);
}

#[test]
fn counter_increments_for_both_categories() {
    let router = SelfRepairRouter::new();
    for incident in kinds::INCIDENTS {
        router.handle(&Event::new(incident, "probe", Severity::Medium));
    }
    router.handle(&Event::new("NOT_AN_INCIDENT", "probe", Severity::Low));
    assert_eq!(router.total_repairs(), kinds::INCIDENTS.len() as u64);
}

#[test]
fn autonomy_follows_the_action_not_the_team() {
    // Both route to the backend team; only one action is autonomous.
    let build = classify_incident(&Event::new(kinds::BUILD_HEALTH_DEGRADED, "ci", Severity::High))
        .unwrap();
    let vuln = classify_incident(&Event::new(kinds::DEPENDENCY_VULN_FOUND, "scan", Severity::High))
        .unwrap();
    assert_eq!(build.team, vuln.team);
    assert_eq!(build.category, RepairCategory::AutoFixed);
    assert_eq!(vuln.category, RepairCategory::NeedsHuman);
}

#[tokio::test]
async fn pipeline_feeds_outcomes_back_into_the_digest() {
    let bus = Arc::new(InMemoryEventBus::default());
    let digest = Arc::new(DigestAggregator::new(std::time::Duration::from_secs(3600)));
    let pipeline = OpsPipeline::new(digest.clone(), bus.clone());
    let mut rx = bus.subscribe();

    bus.publish(Event::new(kinds::DOCS_STALE, "guardian", Severity::Low))
        .await
        .unwrap();
    bus.publish(
        Event::new(kinds::DEPENDENCY_VULN_FOUND, "scanner", Severity::High)
            .with_payload(json!({"serviceDir": "gateway"})),
    )
    .await
    .unwrap();

    // Two incidents plus the two outcomes they produced.
    assert_eq!(pipeline.drain(&mut rx).await.unwrap(), 4);
    assert_eq!(pipeline.router().total_repairs(), 2);

    let pending = digest.pending().await;
    let summaries: Vec<&str> = pending.iter().map(|e| e.summary.as_str()).collect();
    assert_eq!(
        summaries,
        vec![
            "Vulnerability found in gateway",
            "Auto-fixed: update_docs on DOCS_STALE",
            "Human decision needed: Action 'upgrade_major_deps' requires human approval",
        ]
    );
}
