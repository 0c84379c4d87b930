use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

use fleet_sim::simulation::{
    bootstrap_fleet, FleetStore, FleetSummary, OperatingStatus, SimConfig, SimulationClock,
    FLEET_SIZE, TICK_PERIOD_MS,
};

#[derive(Parser)]
#[command(name = "fleet_sim")]
#[command(about = "Headless electric fleet telemetry simulation")]
struct Cli {
    /// Number of ticks to run before exiting (runs until Ctrl-C when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = TICK_PERIOD_MS, value_parser = clap::value_parser!(u64).range(1..))]
    interval_ms: u64,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final fleet snapshot as JSON on stdout
    #[arg(long)]
    dump_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = SimConfig {
        tick_period: Duration::from_millis(cli.interval_ms),
        max_ticks: cli.ticks,
        seed: cli.seed,
    };

    run_headless(config, cli.dump_json).await
}

/// Run the simulation without any consumer other than the log
async fn run_headless(config: SimConfig, dump_json: bool) -> Result<()> {
    info!("Running fleet simulation in headless mode...");
    if let Some(seed) = config.seed {
        info!("Using seed {}", seed);
    }

    let store = Arc::new(FleetStore::new());
    let mut rng = config.rng();
    let side = bootstrap_fleet(&store, &mut rng).context("Failed to bootstrap fleet")?;
    info!("Initial state: {}", FleetSummary::from_snapshot(&store.snapshot()));

    // One summary per full tick; every vehicle update is its own commit
    let mut updates = store.subscribe();
    let summary_logger = tokio::spawn(async move {
        let mut commits: u64 = 0;
        while let Some(snapshot) = updates.recv().await {
            commits += 1;
            debug!("Commit {} received", commits);
            if commits % u64::from(FLEET_SIZE) == 0 {
                info!("{}", FleetSummary::from_snapshot(&snapshot));
            }
        }
        commits
    });

    let mut clock = SimulationClock::new(Arc::clone(&store), side, rng, config.tick_period);
    tokio::select! {
        _ = clock.run(config.max_ticks) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            info!("Shutdown requested");
        }
    }

    let final_snapshot = store.snapshot();
    let ticks = clock.ticks_elapsed();
    let charging = clock.side_state().charging_count();
    drop(clock);
    drop(store);
    let commits = summary_logger
        .await
        .context("Summary logger task failed")?;

    let summary = FleetSummary::from_snapshot(&final_snapshot);
    info!("=== SIMULATION COMPLETE ===");
    info!("Ticks run: {}", ticks);
    info!("Snapshots published: {}", commits);
    info!("Vehicles: {}", summary.vehicles);
    info!("Moving: {}", summary.count(OperatingStatus::Moving));
    info!("Heading to station: {}", summary.count(OperatingStatus::HeadingToStation));
    info!("Charging: {}", summary.count(OperatingStatus::Charging));
    info!("Idle: {}", summary.count(OperatingStatus::Idle));
    info!("In charging cycle: {}", charging);
    info!("Average battery: {:.1}%", summary.average_battery);

    if dump_json {
        let json = serde_json::to_string_pretty(&final_snapshot)
            .context("Failed to serialize final snapshot")?;
        println!("{}", json);
    }

    Ok(())
}
