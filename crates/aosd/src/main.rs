//! AOS daemon
//!
//! Hosts an [`AgentRuntime`]: registers the standard roster, feeds every
//! bus event through the self-repair router and digest buffer, and
//! publishes the ops digest once per window and on shutdown.
//!
//! ## Commands
//!
//! - `run` (default): the long-running ops loop, optionally reading
//!   JSON-lines events from stdin
//! - `simulate-event`: inject one event and print what it caused
//! - `ask`: route one question to an agent and print the answer
//! - `launch-review`: run the launch governance pass on a readiness file

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use aos_core::metrics::METRICS;
use aos_core::telemetry::init_tracing;
use aos_core::{
    parse_event_line, AgentRuntime, AosConfig, DecisionLog, Event, EventSink,
    HttpCompletionService, JsonlDecisionLog, MemoryDecisionLog, ReadinessContext, Severity,
    ToolCatalog,
};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "aosd")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "AOS agent orchestration and governance daemon", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(short, long, global = true, env = "AOS_CONFIG")]
    config: Option<PathBuf>,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override the digest window
    #[arg(long, global = true)]
    digest_window_secs: Option<u64>,

    /// Append launch decisions to this JSON-lines file
    #[arg(long, global = true)]
    audit_log: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the ops loop until interrupted
    Run {
        /// Publish one JSON event per stdin line
        #[arg(long)]
        stdin: bool,
    },

    /// Publish one event, run the ops pipeline over it and print the outcome
    SimulateEvent {
        /// Event type, e.g. DEPLOY_FAILED
        event_type: String,

        #[arg(long, default_value = "medium")]
        severity: Severity,

        #[arg(long, default_value = "aosd")]
        source: String,

        /// JSON payload
        #[arg(long)]
        payload: Option<String>,
    },

    /// Ask a question, routed by keyword unless an agent is named
    Ask {
        question: String,

        /// Send to this agent instead of routing
        #[arg(short, long)]
        agent: Option<String>,
    },

    /// Review launch readiness and print the decision
    LaunchReview {
        /// Readiness context (TOML)
        #[arg(long)]
        context: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json, level);

    let mut config = AosConfig::load(cli.config.as_deref()).context("loading config")?;
    if let Some(secs) = cli.digest_window_secs {
        config.digest.window_secs = secs;
    }

    let completion = HttpCompletionService::new(config.completion.url.clone())
        .context("building completion client")?;
    let decisions: Arc<dyn DecisionLog> = match &cli.audit_log {
        Some(path) => Arc::new(JsonlDecisionLog::new(path)),
        None => Arc::new(MemoryDecisionLog::new()),
    };

    let runtime = AgentRuntime::new(config, Arc::new(completion), ToolCatalog::new(), decisions)
        .context("invalid configuration")?;
    runtime.register_standard_roster().await;

    info!(
        event = "aosd.started",
        version = aos_core::VERSION,
        completion_url = %runtime.config().completion.url,
        digest_window_secs = runtime.config().digest.window_secs,
    );

    match cli.command.unwrap_or(Commands::Run { stdin: false }) {
        Commands::Run { stdin } => run(&runtime, stdin).await,
        Commands::SimulateEvent {
            event_type,
            severity,
            source,
            payload,
        } => {
            let payload = match payload {
                Some(raw) => serde_json::from_str(&raw).context("parsing --payload")?,
                None => Value::Object(Default::default()),
            };
            let event = Event::new(event_type, source, severity).with_payload(payload);
            simulate_event(&runtime, event).await
        }
        Commands::Ask { question, agent } => ask(&runtime, &question, agent.as_deref()).await,
        Commands::LaunchReview { context } => launch_review(&runtime, context).await,
    }
}

async fn run(runtime: &AgentRuntime, read_stdin: bool) -> Result<()> {
    let mut rx = runtime.bus().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = read_stdin;
    let mut tick = tokio::time::interval(runtime.config().digest.window());
    // The first tick completes immediately.
    tick.tick().await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Ok(event) => {
                    if let Err(err) = runtime.ops().handle(&event).await {
                        warn!(event = "aosd.pipeline_failed", event_type = %event.event_type, error = %err);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(event = "aosd.lagged", skipped = skipped);
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => ingest_line(runtime, &line).await,
                Ok(None) => {
                    info!(event = "aosd.stdin_closed");
                    stdin_open = false;
                }
                Err(err) => {
                    warn!(event = "aosd.stdin_failed", error = %err);
                    stdin_open = false;
                }
            },
            _ = tick.tick() => {
                publish_digest(runtime).await;
                METRICS.flush();
            }
            signal = &mut shutdown => {
                if let Err(err) = signal {
                    warn!(event = "aosd.signal_failed", error = %err);
                }
                info!(event = "aosd.shutdown");
                break;
            }
        }
    }

    publish_digest(runtime).await;
    METRICS.flush();
    Ok(())
}

/// Publish one stdin line. The run loop picks it up from the bus.
async fn ingest_line(runtime: &AgentRuntime, line: &str) {
    if line.trim().is_empty() {
        return;
    }
    match parse_event_line(line) {
        Ok(event) => {
            if let Err(err) = runtime.bus().publish(event).await {
                warn!(event = "aosd.ingest_failed", error = %err);
            }
        }
        Err(err) => warn!(event = "aosd.bad_event_line", error = %err),
    }
}

/// Run `event` through the ops pipeline. Returns the events it caused,
/// oldest first.
async fn simulate(runtime: &AgentRuntime, event: Event) -> Result<Vec<Event>> {
    let mut rx = runtime.bus().subscribe();
    let id = event.id.clone();
    let handled = runtime.ingest(event, &mut rx).await?;
    info!(event = "aosd.simulated", id = %id, handled = handled);

    Ok(runtime
        .bus()
        .history()
        .await
        .into_iter()
        .filter(|e| e.payload.get("originalEvent").and_then(Value::as_str) == Some(id.as_str()))
        .collect())
}

async fn simulate_event(runtime: &AgentRuntime, event: Event) -> Result<()> {
    let event_type = event.event_type.clone();
    let caused = simulate(runtime, event).await?;

    if caused.is_empty() {
        println!("{event_type}: no repair route");
    }
    for outcome in &caused {
        println!(
            "{event_type} -> {} [{}] routed to {} ({})",
            outcome.event_type,
            outcome.severity,
            outcome.payload_str("routedTo").unwrap_or_default(),
            outcome.payload_str("action").unwrap_or_default(),
        );
    }
    for entry in runtime.digest().pending().await {
        println!("  digest {:?}: {}", entry.category, entry.summary);
    }
    METRICS.flush();
    Ok(())
}

async fn publish_digest(runtime: &AgentRuntime) {
    if let Err(err) = runtime.publish_digest().await {
        warn!(event = "aosd.digest_failed", error = %err);
    }
}

async fn ask(runtime: &AgentRuntime, question: &str, agent: Option<&str>) -> Result<()> {
    let dispatcher = runtime.dispatcher();
    let result = match agent {
        Some(name) => dispatcher.dispatch_to_agent(name, question, None).await,
        None => dispatcher.route_question(question, None).await,
    };

    println!("[{}] {}", result.agent_name, result.response);
    for outcome in &result.tool_results {
        let status = if outcome.success { "ok" } else { "failed" };
        println!("  tool {} {}", outcome.tool, status);
    }
    if let Some(escalation) = &result.escalation {
        println!("  escalated to {}: {}", escalation.to, escalation.reason);
    }
    println!(
        "  trace {} ({} iteration(s), {}ms)",
        result.trace_id, result.iterations, result.duration_ms
    );
    METRICS.flush();
    Ok(())
}

async fn launch_review(runtime: &AgentRuntime, context: PathBuf) -> Result<()> {
    let ctx = ReadinessContext::load(&context)
        .with_context(|| format!("reading readiness context {}", context.display()))?;
    let decision = runtime.launch_review(&ctx).await?;

    for review in &decision.reviews {
        println!(
            "{:<22} {:<12} {:>3}%  {}",
            review.role,
            review.vote.as_str(),
            review.confidence,
            review.summary
        );
    }
    println!();
    println!("{}", decision.summary);
    METRICS.flush();

    if !decision.approved {
        anyhow::bail!("launch not approved ({:?})", decision.rule);
    }
    Ok(())
}
