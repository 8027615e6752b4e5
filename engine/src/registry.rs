//! Process registry
//!
//! Built once at startup from the discovered topology plus per-service
//! configuration; read-only afterwards, so it needs no locking. Every
//! handle is reachable from exactly one (host, service) entry, with
//! per-service and per-host projections precomputed at build time.

use crate::error::{EngineError, EngineResult};
use crate::handle::RemoteProcessHandle;
use crate::traits::{RemoteExecutor, TopologyCollector};
use shared::FleetConfig;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default)]
pub struct ProcessRegistry {
    by_key: BTreeMap<(String, String), Arc<RemoteProcessHandle>>,
    by_service: BTreeMap<String, Vec<Arc<RemoteProcessHandle>>>,
    by_host: BTreeMap<String, Vec<Arc<RemoteProcessHandle>>>,
}

impl ProcessRegistry {
    /// Build the registry from discovered topology and configuration
    ///
    /// Fails when a service declared in topology has no configuration
    /// entry, when its configuration cannot satisfy the signal-based
    /// actions (no pid path and no override), or when the topology
    /// declares the same (host, service) pair twice.
    pub async fn build<F>(
        topology: &dyn TopologyCollector,
        config: &FleetConfig,
        mut executor_for: F,
    ) -> EngineResult<Self>
    where
        F: FnMut(&str) -> Arc<dyn RemoteExecutor>,
    {
        let nodes = topology.node_properties().await?;
        let mut registry = ProcessRegistry::default();

        for node in &nodes {
            let executor = executor_for(&node.host);

            for service in &node.services {
                let entry = config.service(service).ok_or_else(|| {
                    EngineError::config(format!(
                        "service {} declared on {} but not configured",
                        service, node.host
                    ))
                })?;

                let handle = Arc::new(RemoteProcessHandle::new(
                    service.clone(),
                    node.host.clone(),
                    entry.pid_path.as_deref(),
                    &entry.init,
                    executor.clone(),
                )?);

                registry.insert(handle)?;
            }
        }

        info!(
            hosts = registry.by_host.len(),
            services = registry.by_service.len(),
            handles = registry.by_key.len(),
            "process registry built"
        );
        Ok(registry)
    }

    fn insert(&mut self, handle: Arc<RemoteProcessHandle>) -> EngineResult<()> {
        let key = (handle.host().to_string(), handle.service().to_string());
        if self.by_key.contains_key(&key) {
            return Err(EngineError::config(format!(
                "duplicate registry entry for {} on {}",
                key.1, key.0
            )));
        }

        self.by_service
            .entry(key.1.clone())
            .or_default()
            .push(handle.clone());
        self.by_host
            .entry(key.0.clone())
            .or_default()
            .push(handle.clone());
        self.by_key.insert(key, handle);
        Ok(())
    }

    pub fn lookup(&self, host: &str, service: &str) -> Option<&Arc<RemoteProcessHandle>> {
        self.by_key.get(&(host.to_string(), service.to_string()))
    }

    /// Every handle for one service, ordered by host
    pub fn handles_for(&self, service: &str) -> Vec<Arc<RemoteProcessHandle>> {
        self.by_service.get(service).cloned().unwrap_or_default()
    }

    /// Every handle on one host
    pub fn handles_on(&self, host: &str) -> Vec<Arc<RemoteProcessHandle>> {
        self.by_host.get(host).cloned().unwrap_or_default()
    }

    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.by_service.keys().map(String::as_str)
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.by_host.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
