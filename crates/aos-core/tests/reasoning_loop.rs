mod common;

use aos_core::{
    AgentProfile, AgentTier, ApprovalGate, CompletionError, FnHandler, RiskLevel, TaskInput, Tool,
    ToolCatalog, ToolError, ToolResult, ToolSpec,
};
use common::{engine, failing_tool, recording_tool, CallLog, ScriptedCompletion};
use serde_json::{json, Value};

fn actions(tools: &[&str]) -> String {
    let actions: Vec<Value> = tools
        .iter()
        .map(|t| json!({"tool": t, "args": {"q": t}}))
        .collect();
    json!({"reasoning": "look it up", "actions": actions, "response": "working"}).to_string()
}

fn cfo(tools: &[&str]) -> AgentProfile {
    AgentProfile::new("CFO", AgentTier::CSuite).with_tools(tools.iter().copied())
}

#[tokio::test]
async fn plain_reply_ends_after_one_iteration() {
    let completion = ScriptedCompletion::new(["Revenue is up 12% this week."]);
    let engine = engine(completion.clone(), ToolCatalog::new(), 5);

    let result = engine
        .execute(&cfo(&[]), &TaskInput::from("How is revenue?"), Some("trace-1"))
        .await;

    assert_eq!(result.iterations, 1);
    assert_eq!(result.response, "Revenue is up 12% this week.");
    assert!(result.tool_results.is_empty());
    assert!(result.escalation.is_none());
    assert_eq!(result.trace_id, "trace-1");
    assert_eq!(completion.calls().await, 1);
}

#[tokio::test]
async fn k_actions_run_before_next_completion() {
    let log = CallLog::default();
    let mut tools = ToolCatalog::new();
    for name in ["a", "b", "c"] {
        tools.register(recording_tool(name, log.clone())).unwrap();
    }
    let completion = ScriptedCompletion::new([actions(&["a", "b", "c"]), "All done.".to_string()]);
    let engine = engine(completion.clone(), tools, 5);

    let result = engine
        .execute(&cfo(&["a", "b", "c"]), &TaskInput::from("audit"), None)
        .await;

    assert_eq!(result.iterations, 2);
    assert_eq!(result.response, "All done.");
    assert_eq!(result.tool_results.len(), 3);
    assert!(result.tool_results.iter().all(|o| o.success));

    let calls = log.lock().await;
    let names: Vec<&str> = calls.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(calls[1].1, json!({"q": "b"}));

    let requests = completion.requests.lock().await;
    assert_eq!(requests.len(), 2);
    assert!(requests[1].prompt.starts_with("Tool results:\nTool a: OK"));
    assert!(requests[1].prompt.ends_with("If done, provide your final response."));
}

#[tokio::test]
async fn endless_actions_stop_at_the_iteration_cap() {
    let log = CallLog::default();
    let mut tools = ToolCatalog::new();
    tools.register(recording_tool("a", log.clone())).unwrap();
    tools.register(recording_tool("b", log.clone())).unwrap();
    let completion = ScriptedCompletion::new([actions(&["a", "b"])]);
    let engine = engine(completion.clone(), tools, 5);

    let result = engine
        .execute(&cfo(&["a", "b"]), &TaskInput::from("loop forever"), None)
        .await;

    assert_eq!(result.iterations, 5);
    assert_eq!(result.tool_results.len(), 10);
    assert_eq!(log.lock().await.len(), 10);
    assert_eq!(completion.calls().await, 5);
    assert_eq!(result.response, "working");
}

#[tokio::test]
async fn completion_failure_aborts_with_unavailable_text() {
    let completion =
        ScriptedCompletion::from_results([Err(CompletionError::Transport("connection refused".into()))]);
    let engine = engine(completion.clone(), ToolCatalog::new(), 5);

    let result = engine
        .execute(&cfo(&[]), &TaskInput::from("anything"), None)
        .await;

    assert_eq!(result.iterations, 1);
    assert!(result.response.starts_with("Completion service unavailable:"));
    assert!(result.response.contains("connection refused"));
    assert!(result.response.ends_with("Agent CFO cannot process this task."));
    assert_eq!(completion.calls().await, 1);
}

#[tokio::test]
async fn escalation_wins_over_actions() {
    let log = CallLog::default();
    let mut tools = ToolCatalog::new();
    tools.register(recording_tool("a", log.clone())).unwrap();
    let reply = json!({
        "actions": [{"tool": "a"}],
        "escalate": {"to": "founder", "reason": "refund above limit"},
        "response": "Needs a human."
    })
    .to_string();
    let engine = engine(ScriptedCompletion::new([reply]), tools, 5);

    let result = engine
        .execute(&cfo(&["a"]), &TaskInput::from("refund 5k"), None)
        .await;

    assert_eq!(result.iterations, 1);
    let escalation = result.escalation.expect("escalated");
    assert_eq!(escalation.to, "founder");
    assert_eq!(escalation.reason, "refund above limit");
    assert_eq!(result.response, "Needs a human.");
    assert!(log.lock().await.is_empty());
}

#[tokio::test]
async fn tool_outside_capability_set_is_a_captured_failure() {
    let log = CallLog::default();
    let mut tools = ToolCatalog::new();
    tools.register(recording_tool("payments_refund", log.clone())).unwrap();
    let completion = ScriptedCompletion::new([actions(&["payments_refund"]), "Could not refund.".into()]);
    let engine = engine(completion, tools, 5);

    let result = engine
        .execute(&cfo(&["dashboard_metrics"]), &TaskInput::from("refund"), None)
        .await;

    assert_eq!(result.iterations, 2);
    assert_eq!(result.tool_results.len(), 1);
    let outcome = &result.tool_results[0];
    assert!(!outcome.success);
    assert!(outcome.error.as_deref().unwrap().contains("not permitted for agent CFO"));
    assert!(log.lock().await.is_empty());
}

#[tokio::test]
async fn failing_and_unknown_tools_do_not_stop_the_loop() {
    let log = CallLog::default();
    let mut tools = ToolCatalog::new();
    tools.register(failing_tool("flaky")).unwrap();
    tools.register(recording_tool("ok", log.clone())).unwrap();
    let completion =
        ScriptedCompletion::new([actions(&["flaky", "ghost", "ok"]), "Partial answer.".into()]);
    let engine = engine(completion.clone(), tools, 5);

    let result = engine
        .execute(&cfo(&["flaky", "ghost", "ok"]), &TaskInput::from("go"), None)
        .await;

    let successes: Vec<bool> = result.tool_results.iter().map(|o| o.success).collect();
    assert_eq!(successes, vec![false, false, true]);
    assert_eq!(log.lock().await.len(), 1);

    let requests = completion.requests.lock().await;
    assert!(requests[1].prompt.contains("Tool flaky: FAILED: upstream unavailable"));
    assert!(requests[1].prompt.contains("Tool ghost: ERROR: unknown tool: ghost"));
}

#[tokio::test]
async fn approval_gate_blocks_unapproved_critical_tool() {
    let spec = ToolSpec::new("kill_switch_set", "toggle the kill switch", RiskLevel::Critical);
    let gated = ApprovalGate::new(
        &spec,
        FnHandler(|_args: Value, _trace: String| async move { Ok::<_, ToolError>(ToolResult::ok(json!("toggled"))) }),
    );
    let mut tools = ToolCatalog::new();
    tools.register(Tool::new(spec, gated)).unwrap();

    let blocked = tools
        .invoke("kill_switch_set", &json!({}), "t", std::time::Duration::from_secs(1))
        .await;
    assert!(!blocked.success);
    assert!(blocked.error.unwrap().contains("approval required"));

    let approved = tools
        .invoke(
            "kill_switch_set",
            &json!({"approval_token": "founder-ok"}),
            "t",
            std::time::Duration::from_secs(1),
        )
        .await;
    assert!(approved.success);
}

#[tokio::test]
async fn exchange_is_remembered_and_fed_back() {
    let completion = ScriptedCompletion::new(["First answer.", "Second answer."]);
    let engine = engine(completion.clone(), ToolCatalog::new(), 5);
    let agent = cfo(&[]);

    engine.execute(&agent, &TaskInput::from("first question"), None).await;
    assert_eq!(engine.memory().entries("CFO").await.len(), 2);

    engine.execute(&agent, &TaskInput::from("second"), None).await;
    let requests = completion.requests.lock().await;
    assert!(requests[1].system.contains("first question"));
    assert!(requests[1].system.contains("First answer."));
}

#[tokio::test]
async fn iterations_never_exceed_configured_cap() {
    for cap in 1..=3 {
        let log = CallLog::default();
        let mut tools = ToolCatalog::new();
        tools.register(recording_tool("a", log)).unwrap();
        let engine = engine(ScriptedCompletion::new([actions(&["a"])]), tools, cap);
        let result = engine
            .execute(&cfo(&["a"]), &TaskInput::from("spin"), None)
            .await;
        assert_eq!(result.iterations, cap);
    }
}

#[tokio::test]
async fn loosely_typed_replies_still_run_their_actions() {
    let log = CallLog::default();
    let mut tools = ToolCatalog::new();
    tools.register(recording_tool("a", log.clone())).unwrap();
    let completion = ScriptedCompletion::new([
        json!({"reasoning": "check", "actions": [{"tool": "a", "args": {}}], "response": "working", "escalate": false}).to_string(),
        json!({"reasoning": {"step": 1}, "actions": [{"tool": "a"}], "response": "still working"}).to_string(),
        "Checked twice.".to_string(),
    ]);
    let engine = engine(completion.clone(), tools, 5);

    let result = engine
        .execute(&cfo(&["a"]), &TaskInput::from("check twice"), None)
        .await;

    assert_eq!(result.iterations, 3);
    assert_eq!(result.response, "Checked twice.");
    assert!(result.escalation.is_none());
    assert_eq!(result.tool_results.len(), 2);
    assert_eq!(log.lock().await.len(), 2);
}

#[tokio::test]
async fn empty_completion_text_is_an_empty_final_answer() {
    let completion = ScriptedCompletion::new([""]);
    let engine = engine(completion.clone(), ToolCatalog::new(), 5);

    let result = engine
        .execute(&cfo(&[]), &TaskInput::from("anything?"), None)
        .await;

    assert_eq!(result.iterations, 1);
    assert_eq!(result.response, "");
    assert!(result.escalation.is_none());
    assert_eq!(completion.calls().await, 1);
}
