//! Node status aggregation
//!
//! Fans isRunning probes out across handles concurrently (one task per
//! handle) and assembles per-host reports. Snapshots are never cached;
//! every query recomputes from the cluster. A failed probe fails the
//! whole aggregate call — there is no partial-success contract here.

use crate::error::{EngineError, EngineResult};
use crate::handle::RemoteProcessHandle;
use crate::registry::ProcessRegistry;
use chrono::Utc;
use futures_util::future::try_join_all;
use shared::{NodeStatus, ServiceState};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct StatusAggregator {
    registry: Arc<ProcessRegistry>,
}

impl StatusAggregator {
    pub fn new(registry: Arc<ProcessRegistry>) -> Self {
        Self { registry }
    }

    /// Point-in-time status of every service on one host
    pub async fn node_status(&self, host: &str) -> EngineResult<NodeStatus> {
        let handles = self.registry.handles_on(host);
        if handles.is_empty() {
            return Err(EngineError::not_found(format!("host {}", host)));
        }
        probe_host(host, handles).await
    }

    /// Status of every host in the registry, probed concurrently
    pub async fn all_statuses(&self) -> EngineResult<Vec<NodeStatus>> {
        let hosts: Vec<String> = self.registry.hosts().map(str::to_string).collect();
        try_join_all(hosts.iter().map(|host| self.node_status(host))).await
    }
}

async fn probe_host(
    host: &str,
    handles: Vec<Arc<RemoteProcessHandle>>,
) -> EngineResult<NodeStatus> {
    let probes: Vec<_> = handles
        .into_iter()
        .map(|handle| {
            tokio::spawn(async move {
                let state = if handle.is_running().await? {
                    ServiceState::Running
                } else {
                    ServiceState::Stopped
                };
                Ok::<_, EngineError>((handle.service().to_string(), state))
            })
        })
        .collect();

    let mut services = BTreeMap::new();
    for joined in try_join_all(probes)
        .await
        .map_err(|e| EngineError::invalid_state(format!("status probe panicked: {}", e)))?
    {
        let (service, state) = joined?;
        services.insert(service, state);
    }

    Ok(NodeStatus {
        host: host.to_string(),
        services,
        observed_at: Utc::now(),
    })
}
