//! The `opsmesh` binary: configuration loading, tracing setup, and the
//! operator-facing subcommands around the orchestration engine.

use anyhow::Context;
use clap::{Parser, Subcommand};
use opsmesh_orchestrator::{Orchestrator, OrchestratorConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "opsmesh", about = "Opsmesh — agent task orchestration platform")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "opsmesh.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the orchestrator until interrupted
    Run,
    /// Inspect the agent catalog
    Agents {
        #[command(subcommand)]
        action: AgentAction,
    },
    /// Collect recommendations from the registered agent types
    Recommend {
        /// Restrict to these agent types (default: all)
        #[arg(long = "type")]
        types: Vec<String>,
    },
}

#[derive(Subcommand)]
enum AgentAction {
    /// List registered agents and their capabilities
    List,
}

#[derive(Deserialize, Default)]
struct OpsmeshConfig {
    #[serde(default)]
    orchestrator: OrchestratorConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config).await?;

    match cli.command {
        Commands::Run => run(config.orchestrator).await,
        Commands::Agents {
            action: AgentAction::List,
        } => list_agents(config.orchestrator).await,
        Commands::Recommend { types } => recommend(config.orchestrator, types).await,
    }
}

async fn load_config(path: &Path) -> anyhow::Result<OpsmeshConfig> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => toml::from_str(&raw)
            .with_context(|| format!("invalid config file '{}'", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "config file not found; using defaults");
            Ok(OpsmeshConfig::default())
        }
        Err(e) => {
            Err(e).with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }
}

async fn run(config: OrchestratorConfig) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(config)?;
    orchestrator.start().await;
    info!("orchestrator running; press ctrl-c to stop");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown signal received");
    orchestrator.stop().await;
    Ok(())
}

async fn list_agents(config: OrchestratorConfig) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(config)?;
    let snapshot = orchestrator.snapshot().await;
    for agent in &snapshot.agents {
        println!(
            "{:<18} {}  max_concurrent={}  supports: {}",
            agent.agent_type,
            agent.id,
            agent.capabilities.max_concurrent_tasks,
            agent.capabilities.supported_tasks.join(", ")
        );
    }
    println!("{} agents registered", snapshot.agent_count);
    Ok(())
}

async fn recommend(config: OrchestratorConfig, types: Vec<String>) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(config)?;
    let filter = if types.is_empty() {
        None
    } else {
        Some(types.as_slice())
    };
    let recs = orchestrator
        .recommendations(&serde_json::json!({}), filter)
        .await;
    println!("{}", serde_json::to_string_pretty(&recs)?);
    Ok(())
}
