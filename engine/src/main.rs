//! Main entry point for the chaos engine daemon
//!
//! Loads the fleet configuration, builds the process registry over the
//! ssh transport, and runs the scheduled chaos loops until Ctrl+C.

use clap::Parser;
use std::sync::Arc;
use tokio::signal;

use engine::services::{SshExecutor, StaticTopology};
use engine::{
    schedules_from_config, ChaosScheduler, EngineResult, ProcessRegistry, StatusAggregator,
};
use shared::{logging, FleetConfig};

/// Chaos engine: scheduled, probability-driven service disruption
#[derive(Parser)]
#[command(name = "engine")]
#[command(about = "Disrupts fleet services on a schedule to validate resilience")]
pub struct Args {
    /// Path to the fleet configuration file (JSON)
    #[arg(long, default_value = "fleet.json")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Print the fleet status at startup
    #[arg(long)]
    pub status: bool,
}

#[tokio::main]
async fn main() -> EngineResult<()> {
    let args = Args::parse();

    logging::init_tracing(Some(&args.log_level));
    logging::log_startup("chaos engine");

    let config = FleetConfig::load(&args.config)?;
    let topology = StaticTopology::from_config(&config);

    let ssh_user = config.ssh_user.clone();
    let registry = Arc::new(
        ProcessRegistry::build(&topology, &config, |host| {
            Arc::new(SshExecutor::new(host, ssh_user.clone()))
        })
        .await?,
    );

    if args.status {
        let aggregator = StatusAggregator::new(registry.clone());
        match aggregator.all_statuses().await {
            Ok(statuses) => {
                for status in statuses {
                    for (service, state) in &status.services {
                        tracing::info!(host = %status.host, %service, %state, "fleet status");
                    }
                }
            }
            Err(e) => logging::log_error("Fleet status probe", &e),
        }
    }

    let schedules = schedules_from_config(&config, &registry);
    if schedules.is_empty() {
        tracing::warn!("no service is schedulable; the engine will sit idle");
    }
    let handles = ChaosScheduler::new(registry).spawn(schedules);
    tracing::info!(loops = handles.len(), "💥 chaos loops running");

    match signal::ctrl_c().await {
        Ok(()) => logging::log_shutdown("Received Ctrl+C signal"),
        Err(err) => logging::log_error("Signal handling", &err),
    }

    for handle in handles {
        handle.abort();
    }
    logging::log_success("Chaos engine stopped gracefully");
    Ok(())
}
