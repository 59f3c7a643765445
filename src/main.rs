//! dining-sim - dining philosophers simulator
//!
//! Runs the ring for a bounded window (or until Ctrl-C) and reports every
//! state change, either through tracing or as JSON lines. This binary is a
//! demonstration observer; the engine itself lives in the library.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use dining_sim::{Simulation, SimulationConfig};

/// dining-sim - dining philosophers simulator CLI
#[derive(Parser)]
#[command(name = "dining-sim")]
#[command(about = "Simulate N philosophers contending for shared forks without deadlocking")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Number of philosophers in the ring
    #[arg(short = 'n', long, default_value_t = 5)]
    philosophers: usize,

    /// Thinking duration in milliseconds
    #[arg(long, default_value_t = 2000)]
    think_ms: u64,

    /// Eating duration in milliseconds
    #[arg(long, default_value_t = 3000)]
    eat_ms: u64,

    /// Per-cycle duration jitter fraction, in [0, 1)
    #[arg(long, default_value_t = 0.0)]
    jitter: f64,

    /// Stop after this many milliseconds; runs until Ctrl-C when omitted
    #[arg(long)]
    run_for_ms: Option<u64>,

    /// Emit state changes as JSON lines on stdout instead of log events
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = cli
        .log_level
        .parse::<tracing::Level>()
        .map_err(|_| anyhow::anyhow!("invalid log level: {}", cli.log_level))?;
    tracing_subscriber::fmt().with_max_level(log_level).init();

    let config = SimulationConfig {
        philosophers: cli.philosophers,
        think_duration: Duration::from_millis(cli.think_ms),
        eat_duration: Duration::from_millis(cli.eat_ms),
        duration_jitter: cli.jitter,
        ..Default::default()
    };

    let mut simulation = Simulation::new(config)?;
    let mut events = simulation.subscribe();
    simulation.start();

    let json = cli.json;
    let observer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(change) => {
                    if json {
                        match serde_json::to_string(&change) {
                            Ok(line) => println!("{line}"),
                            Err(e) => warn!(error = %e, "failed to encode state change"),
                        }
                    } else {
                        info!(philosopher = change.philosopher, state = %change.state, "state change");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "observer lagged behind the simulation");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    match cli.run_for_ms {
        Some(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
        None => {
            tokio::signal::ctrl_c().await?;
            info!("interrupt received, shutting down");
        }
    }

    simulation.shutdown().await?;
    observer.await?;
    Ok(())
}
