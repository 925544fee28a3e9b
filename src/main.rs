//! Signalmesh - multi-node trading analysis consensus engine
//!
//! An HTTP service that fans a trading query out to a fleet of Ollama
//! persona nodes (analyst, risk manager, strategist), joins all outcomes
//! under one shared deadline, tolerates partial failure and synthesizes
//! a unified signal with an agreement score.
//!
//! Exit codes:
//!   0 - Clean shutdown (or --ping-all / --init-config completed)
//!   1 - Runtime error (bind failure, bad config, unreadable node store)

mod cli;
mod client;
mod config;
mod consensus;
mod directory;
mod error;
mod models;
mod orchestrator;
mod probe;
mod prompts;
mod server;
mod signal;
mod splitter;

use anyhow::{Context, Result};
use cli::Args;
use client::InferenceClient;
use config::Config;
use directory::NodeDirectory;
use orchestrator::ScatterGatherOrchestrator;
use probe::HealthProbe;
use server::AppState;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Signalmesh v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Fatal: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .signalmesh.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".signalmesh.toml");

    if path.exists() {
        eprintln!("⚠️  .signalmesh.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .signalmesh.toml")?;

    println!("✅ Created .signalmesh.toml with default settings.");
    println!("   Edit it to set the listen address, deadline and node store path.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

async fn run(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Open the node store, seeding the three default persona nodes on
    // first run.
    let directory = Arc::new(NodeDirectory::open(config.nodes.store.clone())?);
    let client = InferenceClient::new();
    let probe = HealthProbe::new(
        directory.clone(),
        client.clone(),
        Duration::from_secs(config.dispatch.ping_timeout_seconds),
    );

    // Handle --ping-all: probe every node once and exit
    if args.ping_all {
        return handle_ping_all(&directory, &probe).await;
    }

    let orchestrator = ScatterGatherOrchestrator::new(
        directory.clone(),
        client,
        Duration::from_secs(config.dispatch.deadline_seconds),
    );

    if config.server.admin_key.is_empty() {
        warn!("No admin key configured, the /admin surface is disabled");
    }

    let state = Arc::new(AppState {
        directory,
        orchestrator,
        probe,
        admin_key: config.server.admin_key.clone(),
    });
    let router = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen))?;

    info!("Listening on {}", config.server.listen);
    info!(
        "Dispatch deadline: {}s, ping timeout: {}s, node store: {}",
        config.dispatch.deadline_seconds, config.dispatch.ping_timeout_seconds, config.nodes.store
    );

    axum::serve(listener, router)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Handle --ping-all: probe every configured node once, print the results.
async fn handle_ping_all(directory: &Arc<NodeDirectory>, probe: &HealthProbe) -> Result<()> {
    let nodes = directory.read_all()?;

    println!("🔎 Probing {} nodes...\n", nodes.len());

    for node in &nodes {
        match probe.ping(&node.id).await? {
            Some(outcome) if outcome.reachable => {
                println!(
                    "   🟢 {} ({}) - online, {}ms, models: {}",
                    node.id,
                    node.persona,
                    outcome.latency,
                    if outcome.models.is_empty() {
                        "none".to_string()
                    } else {
                        outcome.models.join(", ")
                    }
                );
            }
            Some(outcome) => {
                println!(
                    "   🔴 {} ({}) - {}",
                    node.id,
                    node.persona,
                    outcome.error.as_deref().unwrap_or("unreachable")
                );
            }
            None => {
                // Node removed between read and probe; skip.
                warn!("Node {} disappeared during probe", node.id);
            }
        }
    }

    println!("\n✅ Probe complete.");
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .signalmesh.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
