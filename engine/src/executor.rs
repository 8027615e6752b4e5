//! Disruption executor
//!
//! Resolves a disruption request into a concrete target set, takes the
//! per-(service, action) guard, and dispatches the work on its own task.
//! Validation, NotFound, and Conflict are returned synchronously; once
//! the task is spawned the call returns and completion is observed only
//! through `action_status` / `wait_for`. Transport failures inside the
//! task are logged per handle and never resurface to the caller.

use crate::error::{EngineError, EngineResult};
use crate::guard::DisruptionGuard;
use crate::handle::RemoteProcessHandle;
use crate::registry::ProcessRegistry;
use crate::rolling::{rolling_restart, DEFAULT_DELAY, DEFAULT_RESTART_TIME};
use crate::selector::{select, SelectionSpec};
use serde::Deserialize;
use shared::{Action, ActionStatus};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Optional per-call tuning for rolling restart
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraArgs {
    pub restart_time_seconds: Option<i64>,
    pub delay_seconds: Option<i64>,
}

impl ExtraArgs {
    /// Downtime per instance; absent or negative falls back to 30s
    pub fn restart_time(&self) -> Duration {
        secs_or(self.restart_time_seconds, DEFAULT_RESTART_TIME)
    }

    /// Settle time between instances; absent or negative falls back to 120s
    pub fn delay(&self) -> Duration {
        secs_or(self.delay_seconds, DEFAULT_DELAY)
    }
}

fn secs_or(value: Option<i64>, default: Duration) -> Duration {
    match value {
        Some(secs) if secs >= 0 => Duration::from_secs(secs as u64),
        _ => default,
    }
}

/// Releases the guard on every exit path of the spawned task, panics
/// included.
struct HeldGuard {
    guard: Arc<DisruptionGuard>,
    service: String,
    action: Action,
}

impl Drop for HeldGuard {
    fn drop(&mut self) {
        self.guard.release(&self.service, self.action);
    }
}

pub struct DisruptionExecutor {
    registry: Arc<ProcessRegistry>,
    guard: Arc<DisruptionGuard>,
}

impl DisruptionExecutor {
    pub fn new(registry: Arc<ProcessRegistry>) -> Self {
        let guard = Arc::new(DisruptionGuard::new(registry.services()));
        Self { registry, guard }
    }

    pub fn registry(&self) -> &Arc<ProcessRegistry> {
        &self.registry
    }

    /// Resolve targets, take the guard, and dispatch the disruption
    ///
    /// Fire-and-forget: `Ok` means the disruption was accepted and is
    /// running, not that it succeeded. The selection is validated before
    /// the service lookup, so a malformed request fails the same way no
    /// matter what it names.
    pub async fn execute_action(
        &self,
        service: &str,
        action: Action,
        spec: &SelectionSpec,
        extra: ExtraArgs,
    ) -> EngineResult<()> {
        spec.validate()?;

        let candidates = self.registry.handles_for(service);
        if candidates.is_empty() {
            return Err(EngineError::not_found(format!("service {}", service)));
        }

        let targets = select(&candidates, spec, &mut rand::thread_rng())?;
        if action == Action::RollingRestart && targets.is_empty() {
            return Err(EngineError::invalid_state(
                "rolling restart requires at least one target",
            ));
        }

        self.guard.try_acquire(service, action)?;
        let held = HeldGuard {
            guard: self.guard.clone(),
            service: service.to_string(),
            action,
        };

        info!(
            service,
            %action,
            targets = targets.len(),
            "disruption dispatched"
        );

        tokio::spawn(async move {
            let _held = held;
            match action {
                Action::RollingRestart => {
                    if let Err(e) = rolling_restart(
                        &targets,
                        extra.restart_time(),
                        extra.delay(),
                    )
                    .await
                    {
                        warn!(%action, error = %e, "rolling restart aborted");
                    }
                }
                _ => run_batch(&targets, action).await,
            }
        });

        Ok(())
    }

    /// Read-only guard snapshot for one (service, action) pair
    pub fn action_status(&self, service: &str, action: Action) -> EngineResult<ActionStatus> {
        self.guard.status(service, action)
    }

    /// Poll once per second until the pair goes idle or the timeout lapses
    pub async fn wait_for(
        &self,
        service: &str,
        action: Action,
        timeout: Duration,
    ) -> EngineResult<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if !self.action_status(service, action)?.running {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(EngineError::Timeout {
                    service: service.to_string(),
                    action,
                    timeout,
                });
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }
}

/// Apply one action across a target set, best-effort
///
/// A transport failure on one handle is logged and does not stop the
/// remaining handles from being processed.
pub(crate) async fn run_batch(targets: &[Arc<RemoteProcessHandle>], action: Action) {
    for handle in targets {
        if let Err(e) = disrupt_one(handle, action).await {
            warn!(
                service = handle.service(),
                host = handle.host(),
                %action,
                error = %e,
                "transport failure; continuing with remaining targets"
            );
        }
    }
}

/// The per-handle algorithm for one action
async fn disrupt_one(handle: &Arc<RemoteProcessHandle>, action: Action) -> EngineResult<()> {
    match action {
        Action::Start => {
            if handle.is_running().await? {
                debug!(
                    service = handle.service(),
                    host = handle.host(),
                    "already running; start skipped"
                );
                return Ok(());
            }
            handle.start().await?;
            if !handle.is_running().await? {
                warn!(
                    service = handle.service(),
                    host = handle.host(),
                    "still not running after start"
                );
            }
        }
        Action::Stop | Action::Terminate | Action::Kill => {
            if !handle.is_running().await? {
                debug!(
                    service = handle.service(),
                    host = handle.host(),
                    %action,
                    "already stopped; skipped"
                );
                return Ok(());
            }
            handle.apply(action).await?;
            if handle.is_running().await? {
                warn!(
                    service = handle.service(),
                    host = handle.host(),
                    %action,
                    "still running after halting disruption"
                );
            }
        }
        Action::Restart => {
            handle.restart().await?;
            if !handle.is_running().await? {
                warn!(
                    service = handle.service(),
                    host = handle.host(),
                    "not running after restart"
                );
            }
        }
        Action::RollingRestart => {
            // handled as a sequence in execute_action, never per handle
            return Err(EngineError::invalid_state(
                "rolling-restart is not a per-handle action",
            ));
        }
    }
    Ok(())
}
