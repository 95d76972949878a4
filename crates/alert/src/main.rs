//! CLI that runs the alert service against the log channel.
//!
//! Run `ci-alert --help` for usage information.

use alert::{AlertConfig, AlertService, Alerter, AlerterGroup, LogAlerter};
use anyhow::{Context, Result};
use builds::{AnalyzedActors, BuildEvent};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ci-alert")]
#[command(about = "Debounced CI build alerting")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a file of JSON-lines build events to the service
    Replay {
        /// File with one build event per line
        #[arg(short, long)]
        file: PathBuf,

        /// Time to let channels settle before shutting down (ms)
        #[arg(long, default_value = "500", env = "CI_ALERT_SETTLE_MS")]
        settle_ms: u64,
    },

    /// Run a scripted sequence of breaks and fixes
    Demo {
        /// Pause between steps (ms)
        #[arg(long, default_value = "2000", env = "CI_ALERT_STEP_MS")]
        step_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("alert=debug,builds=debug,info")
        } else {
            EnvFilter::new("alert=info,builds=info,warn")
        }
    });
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = AlertConfig::from_env();
    let group = if config.disabled {
        info!("Alerting disabled via ALERT_DISABLED");
        AlerterGroup::empty()
    } else {
        let channels: Vec<Arc<dyn Alerter>> = vec![Arc::new(LogAlerter::new())];
        AlerterGroup::new(channels, config.channel_timeout)
    };
    let service = AlertService::start(group, &config);

    let result = match cli.command {
        Commands::Replay { file, settle_ms } => replay(&service, &file, settle_ms).await,
        Commands::Demo { step_ms } => demo(&service, step_ms).await,
    };

    let actors = AnalyzedActors::new(&service.builds());
    info!(
        heroes = actors.heroes.len(),
        villains = actors.villains.len(),
        "Final attribution"
    );
    service.shutdown().await;
    result
}

async fn replay(service: &AlertService, file: &Path, settle_ms: u64) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let events = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str::<BuildEvent>(line)
                .with_context(|| format!("Invalid build event on line {}", n + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    let applied = service
        .process(events)
        .context("Failed to process build events")?;
    info!(applied, file = %file.display(), "Replayed build events");

    tokio::time::sleep(Duration::from_millis(settle_ms)).await;
    Ok(())
}

async fn demo(service: &AlertService, step_ms: u64) -> Result<()> {
    let pause = || tokio::time::sleep(Duration::from_millis(step_ms));

    service.broken("bolt", "smoke", ["cdehaudt"])?;
    pause().await;
    service.fixed("bolt", "smoke", ["cdehaudt"])?;
    service.broken("bolt", "regression", ["machung"])?;
    pause().await;
    service.broken("bolt", "smoke", ["dxie"])?;
    pause().await;
    service.broken("bolt", "smoke", ["fuzhong", "cjerome"])?;
    pause().await;
    Ok(())
}
