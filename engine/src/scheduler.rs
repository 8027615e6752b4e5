//! Scheduled chaos loop
//!
//! One independent periodic task per configured service. Each tick draws
//! a uniform r, picks a node count between the configured bounds,
//! shuffles the service's targets, and either stops, kills, or restarts
//! the chosen nodes — or does nothing — according to the configured
//! probabilities. The scheduler is a separate caller path from the
//! executor and deliberately does not take the disruption guard.

use crate::executor::run_batch;
use crate::registry::ProcessRegistry;
use crate::error::{EngineError, EngineResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use shared::{Action, FleetConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Validated scheduling parameters for one service
#[derive(Debug, Clone)]
pub struct ScheduledServiceConfig {
    service: String,
    stop_probability: f64,
    kill_probability: f64,
    restart_probability: f64,
    period: Duration,
    min_nodes: usize,
    max_nodes: usize,
}

impl ScheduledServiceConfig {
    /// Construct and validate; every violation is a hard error
    ///
    /// Negative node bounds count from the end of the target list, so
    /// -1 with 10 targets resolves to 9.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        service: impl Into<String>,
        stop_probability: f64,
        kill_probability: f64,
        restart_probability: f64,
        period_seconds: u64,
        min_nodes_per_iteration: i64,
        max_nodes_per_iteration: i64,
        total_targets: usize,
    ) -> EngineResult<Self> {
        let service = service.into();

        for (name, p) in [
            ("stopProbability", stop_probability),
            ("killProbability", kill_probability),
            ("restartProbability", restart_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(EngineError::config(format!(
                    "{}: {} = {} is not in [0, 1]",
                    service, name, p
                )));
            }
        }
        if stop_probability + kill_probability + restart_probability > 1.0 {
            return Err(EngineError::config(format!(
                "{}: probabilities sum to more than 1",
                service
            )));
        }
        if period_seconds == 0 {
            return Err(EngineError::config(format!(
                "{}: interval must be positive",
                service
            )));
        }

        let min_nodes = resolve_bound(&service, min_nodes_per_iteration, total_targets)?;
        let max_nodes = resolve_bound(&service, max_nodes_per_iteration, total_targets)?;
        if min_nodes > max_nodes {
            return Err(EngineError::config(format!(
                "{}: minNodesPerIteration {} exceeds maxNodesPerIteration {}",
                service, min_nodes, max_nodes
            )));
        }
        if max_nodes > total_targets {
            return Err(EngineError::config(format!(
                "{}: maxNodesPerIteration {} exceeds {} targets",
                service, max_nodes, total_targets
            )));
        }

        Ok(Self {
            service,
            stop_probability,
            kill_probability,
            restart_probability,
            period: Duration::from_secs(period_seconds),
            min_nodes,
            max_nodes,
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn min_nodes(&self) -> usize {
        self.min_nodes
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }
}

/// Array-negative-index semantics: -1 means "all but one"
fn resolve_bound(service: &str, bound: i64, total_targets: usize) -> EngineResult<usize> {
    let resolved = if bound < 0 {
        bound + total_targets as i64
    } else {
        bound
    };
    usize::try_from(resolved).map_err(|_| {
        EngineError::config(format!(
            "{}: node bound {} resolves below zero for {} targets",
            service, bound, total_targets
        ))
    })
}

/// Build the schedule list from raw configuration
///
/// A service without a positive interval, with no probability
/// configured, or with invalid parameters is excluded with a warning;
/// bad scheduling config never takes the engine down.
pub fn schedules_from_config(
    config: &FleetConfig,
    registry: &ProcessRegistry,
) -> Vec<ScheduledServiceConfig> {
    let mut schedules = Vec::new();

    for (service, entry) in &config.services {
        let total_targets = registry.handles_for(service).len();

        let interval = match entry.interval {
            Some(secs) if secs > 0 => secs,
            _ => {
                warn!(%service, "no valid interval; excluded from scheduling");
                continue;
            }
        };

        let stop = entry.stop_probability.unwrap_or(0.0);
        let kill = entry.kill_probability.unwrap_or(0.0);
        let restart = entry.restart_probability.unwrap_or(0.0);
        if stop == 0.0 && kill == 0.0 && restart == 0.0 {
            warn!(%service, "no disruption probability; excluded from scheduling");
            continue;
        }

        let min_nodes = entry.min_nodes_per_iteration.unwrap_or(1);
        let max_nodes = entry
            .max_nodes_per_iteration
            .unwrap_or(total_targets as i64);

        match ScheduledServiceConfig::new(
            service.clone(),
            stop,
            kill,
            restart,
            interval,
            min_nodes,
            max_nodes,
            total_targets,
        ) {
            Ok(schedule) => schedules.push(schedule),
            Err(e) => warn!(%service, error = %e, "excluded from scheduling"),
        }
    }

    schedules
}

/// Spawns and owns the per-service chaos loops
pub struct ChaosScheduler {
    registry: Arc<ProcessRegistry>,
}

impl ChaosScheduler {
    pub fn new(registry: Arc<ProcessRegistry>) -> Self {
        Self { registry }
    }

    /// Spawn one fixed-rate loop per schedule; first tick is immediate
    ///
    /// `tokio::time::interval` keeps the nominal schedule anchored to
    /// task start; an iteration that runs long eats into the next tick's
    /// slot rather than shifting the schedule.
    pub fn spawn(&self, schedules: Vec<ScheduledServiceConfig>) -> Vec<JoinHandle<()>> {
        schedules
            .into_iter()
            .map(|schedule| {
                let registry = self.registry.clone();
                info!(
                    service = schedule.service(),
                    period_secs = schedule.period().as_secs(),
                    "chaos loop scheduled"
                );
                tokio::spawn(async move {
                    let mut rng = StdRng::from_entropy();
                    let mut ticker = tokio::time::interval(schedule.period());
                    loop {
                        ticker.tick().await;
                        run_tick(&schedule, &registry, &mut rng).await;
                    }
                })
            })
            .collect()
    }
}

/// One scheduler iteration for one service
pub(crate) async fn run_tick<R: Rng + Send>(
    schedule: &ScheduledServiceConfig,
    registry: &ProcessRegistry,
    rng: &mut R,
) {
    let r: f64 = rng.gen();
    let num_nodes = rng.gen_range(schedule.min_nodes..=schedule.max_nodes);

    let mut targets = registry.handles_for(&schedule.service);
    targets.shuffle(rng);
    targets.truncate(num_nodes);

    let stop_cut = schedule.stop_probability;
    let kill_cut = stop_cut + schedule.kill_probability;
    let restart_cut = kill_cut + schedule.restart_probability;

    let action = if r < stop_cut {
        Action::Stop
    } else if r < kill_cut {
        Action::Kill
    } else if r < restart_cut {
        Action::Restart
    } else {
        debug!(service = %schedule.service, "chaos tick: no-op");
        return;
    };

    info!(
        service = %schedule.service,
        %action,
        nodes = targets.len(),
        "chaos tick"
    );
    run_batch(&targets, action).await;
}
