//! Proctor Agent CLI
//!
//! Demo shell around the proctoring core: joins an exam session, runs
//! the detectors against a simulated camera, and renders the local event
//! log and backend suspicion summary.

use anyhow::Context;
use clap::{Parser, Subcommand};
use proctor_agent::{
    Config, EventType, HttpFrameAnalyzer, SessionController, Severity, SimulatedCamera, VERSION,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "proctor-agent")]
#[command(version = VERSION)]
#[command(about = "Client-side exam-proctoring monitor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join an exam session and start monitoring
    Start {
        /// Exam identifier
        #[arg(long, default_value = "demo-exam-1")]
        exam_id: String,

        /// Candidate identifier
        #[arg(long, default_value = "student-001")]
        user_id: String,

        /// Candidate display name
        #[arg(long, default_value = "Alex Student")]
        name: String,

        /// Backend base URL (overrides the config file)
        #[arg(long)]
        backend_url: Option<String>,

        /// How long to monitor before leaving, in seconds
        #[arg(long, default_value = "30")]
        duration: u64,

        /// Simulated emissions to fire after joining
        /// (comma-separated: tab_blur, multi_face, screen_share, ...)
        #[arg(long, default_value = "")]
        simulate: String,
    },

    /// Show configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            exam_id,
            user_id,
            name,
            backend_url,
            duration,
            simulate,
        } => cmd_start(exam_id, user_id, name, backend_url, duration, &simulate).await,
        Commands::Config => cmd_config(),
    }
}

async fn cmd_start(
    exam_id: String,
    user_id: String,
    name: String,
    backend_url: Option<String>,
    duration: u64,
    simulate: &str,
) -> anyhow::Result<()> {
    let mut config = Config::load().context("loading configuration")?;
    if let Some(url) = backend_url {
        config.backend = proctor_agent::BackendConfig::new(url);
    }

    println!("Proctor Agent v{VERSION}");
    println!("  Backend: {}", config.backend.base_url);
    println!("  Frame interval: {}s", config.frame_interval.as_secs());
    println!("  Poll interval: {}s", config.poll_interval.as_secs());
    println!();

    let camera = Arc::new(SimulatedCamera::new());
    let analyzer = Arc::new(HttpFrameAnalyzer::new(&config.backend));
    let mut controller = SessionController::new(config, camera.clone(), analyzer);

    let session = controller
        .join(exam_id, user_id, Some(name))
        .context("joining exam session")?;
    println!(
        "Joined exam {} as {} ({})",
        session.exam_id,
        session.user_id,
        session.display_name.as_deref().unwrap_or("-")
    );

    // Simulate camera negotiation finishing shortly after join.
    let negotiating = camera.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        negotiating.set_ready_state(proctor_agent::READY_STATE_HAVE_CURRENT_DATA);
        tracing::info!("camera ready");
    });

    for (event_type, severity) in parse_simulations(simulate) {
        println!("Simulating {event_type} ({severity})");
        controller.simulate(event_type, severity);
    }

    println!();
    println!("Monitoring for {duration}s (Ctrl+C to stop early)");
    println!();

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(duration)) => {}
        result = tokio::signal::ctrl_c() => {
            result.context("waiting for Ctrl+C")?;
            println!();
            println!("Interrupted, leaving session...");
        }
    }

    let events = controller.events();
    let summary = controller.summary();
    controller.leave();

    println!();
    println!("Recent Events ({}):", events.len());
    for event in &events {
        println!(
            "  [{}] {} ({}) {}",
            event.timestamp.format("%H:%M:%S"),
            event.event_type,
            event.severity,
            event.data
        );
    }

    println!();
    match summary {
        Some(summary) => {
            println!("Suspicion Summary:");
            println!("  Total events: {}", summary.total_events);
            println!(
                "  Suspicion score: {} ({})",
                summary.suspicion_score, summary.suspicion_level
            );
            if !summary.counts.is_empty() {
                println!("  Counts:");
                let mut counts: Vec<_> = summary.counts.iter().collect();
                counts.sort();
                for (event_type, count) in counts {
                    println!("    {event_type}: {count}");
                }
            }
        }
        None => println!("Suspicion Summary: no successful poll (backend unreachable?)"),
    }

    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

/// Parse a comma-separated simulation list into emissions with the
/// severities the real detectors would assign.
fn parse_simulations(list: &str) -> Vec<(EventType, Severity)> {
    list.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|name| match name {
            "tab_blur" => Some((EventType::TabBlur, Severity::Medium)),
            "tab_focus" => Some((EventType::TabFocus, Severity::Low)),
            "phone_detected" => Some((EventType::PhoneDetected, Severity::Medium)),
            "gaze_anomaly" => Some((EventType::GazeAnomaly, Severity::Low)),
            "multi_face" => Some((EventType::MultiFace, Severity::High)),
            "screen_share" => Some((EventType::ScreenShare, Severity::High)),
            other => {
                eprintln!("Warning: unknown simulation '{other}', skipping");
                None
            }
        })
        .collect()
}
