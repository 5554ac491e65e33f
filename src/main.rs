use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use liftsim::{Building, Config, InMemoryMetrics, LogWriter, Simulation, Subscribe};

#[derive(Parser, Debug)]
#[command(author, version, about = "Discrete-tick elevator dispatch simulator")]
struct Args {
    /// JSON configuration file; missing fields take defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of floors
    #[arg(long)]
    floors: Option<usize>,

    /// Number of elevators
    #[arg(long)]
    elevators: Option<usize>,

    /// Tick interval in milliseconds
    #[arg(long = "tick-ms")]
    tick_ms: Option<u64>,

    /// Seed for the random request generator
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many ticks instead of waiting for a signal
    #[arg(long)]
    ticks: Option<u64>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(v) = self.floors {
            cfg.floor_count = v;
        }
        if let Some(v) = self.elevators {
            cfg.elevator_count = v;
        }
        if let Some(v) = self.tick_ms {
            cfg.tick_interval_ms = v;
        }
        if let Some(v) = self.seed {
            cfg.generator_seed = Some(v);
        }
        cfg.validate().context("invalid configuration")?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let cfg = args.config()?;
    tracing::info!(
        floors = cfg.floor_count,
        elevators = cfg.elevator_count,
        tick_ms = cfg.tick_interval_ms,
        "starting simulation"
    );

    let metrics = Arc::new(InMemoryMetrics::new());
    let building = Arc::new(
        Building::builder(cfg)
            .with_metrics(Arc::clone(&metrics))
            .build()
            .context("building setup")?,
    );

    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let mut sim = Simulation::new(Arc::clone(&building)).with_subscribers(subscribers);
    if let Some(n) = args.ticks {
        sim = sim.with_max_ticks(n);
    }
    let outcome = sim.run().await;

    let snapshot = serde_json::to_string(&building.snapshot()).context("encoding snapshot")?;
    let totals = serde_json::to_string(&metrics.snapshot()).context("encoding metrics")?;
    tracing::info!(%snapshot, "final state");
    tracing::info!(%totals, "metrics");

    outcome.context("simulation ended abnormally")
}

fn init_tracing(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt().with_env_filter(env_filter).try_init();
}
