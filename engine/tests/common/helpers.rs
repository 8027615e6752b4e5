//! Test helpers: an in-memory fleet behind a fake ssh transport
//!
//! `FakeTransport` interprets the same command strings the handles
//! build for real hosts (sysv service commands and pid-file signals)
//! against a shared in-memory fleet state, recording every mutating
//! command in order.

use async_trait::async_trait;
use engine::traits::RemoteExecutor;
use engine::{EngineError, EngineResult, ProcessRegistry};
use engine::services::StaticTopology;
use shared::{FleetConfig, NodeEntry, ServiceEntry};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared mutable state of the simulated fleet
#[derive(Default)]
pub struct FleetState {
    running: Mutex<HashMap<(String, String), bool>>,
    failed_hosts: Mutex<HashSet<String>>,
    log: Mutex<Vec<String>>,
}

impl FleetState {
    pub fn set_running(&self, host: &str, service: &str, running: bool) {
        self.running
            .lock()
            .unwrap()
            .insert((host.to_string(), service.to_string()), running);
    }

    pub fn is_running(&self, host: &str, service: &str) -> bool {
        *self
            .running
            .lock()
            .unwrap()
            .get(&(host.to_string(), service.to_string()))
            .unwrap_or(&false)
    }

    /// Make every command against this host fail at the transport level
    pub fn fail_host(&self, host: &str) {
        self.failed_hosts.lock().unwrap().insert(host.to_string());
    }

    /// Every mutating command so far, in execution order ("stop svc-a@h1")
    pub fn commands(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, verb: &str, service: &str, host: &str) {
        self.log
            .lock()
            .unwrap()
            .push(format!("{} {}@{}", verb, service, host));
    }
}

/// Fake per-host transport interpreting the handles' command strings
pub struct FakeTransport {
    host: String,
    state: Arc<FleetState>,
    latency: Duration,
}

/// Service name out of a default pid path ("/var/run/<svc>.pid")
fn service_from_pid_path(command: &str) -> Option<&str> {
    let start = command.rfind('/')? + 1;
    let end = command.rfind(".pid")?;
    command.get(start..end)
}

#[async_trait]
impl RemoteExecutor for FakeTransport {
    async fn run_command(&self, command: &str) -> EngineResult<i32> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.state.failed_hosts.lock().unwrap().contains(&self.host) {
            return Err(EngineError::transport(&self.host, "connection refused"));
        }

        let parts: Vec<&str> = command.split_whitespace().collect();
        match parts.as_slice() {
            ["service", service, "status"] => {
                Ok(if self.state.is_running(&self.host, service) { 0 } else { 3 })
            }
            ["service", service, "start"] => {
                self.state.record("start", service, &self.host);
                self.state.set_running(&self.host, service, true);
                Ok(0)
            }
            ["service", service, "stop"] => {
                self.state.record("stop", service, &self.host);
                self.state.set_running(&self.host, service, false);
                Ok(0)
            }
            ["service", service, "restart"] => {
                self.state.record("restart", service, &self.host);
                self.state.set_running(&self.host, service, true);
                Ok(0)
            }
            ["kill", "-s", sig, ..] => match service_from_pid_path(command) {
                Some(service) => {
                    let verb = if *sig == "TERM" { "terminate" } else { "kill" };
                    self.state.record(verb, service, &self.host);
                    self.state.set_running(&self.host, service, false);
                    Ok(0)
                }
                None => Ok(1),
            },
            ["test", ..] => Ok(0),
            _ => Ok(127),
        }
    }
}

/// Builder for a simulated cluster with a registry wired to fake transports
pub struct ClusterBuilder {
    nodes: Vec<(String, Vec<String>)>,
    latency: Duration,
}

impl ClusterBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            latency: Duration::ZERO,
        }
    }

    pub fn node(mut self, host: &str, services: &[&str]) -> Self {
        self.nodes.push((
            host.to_string(),
            services.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Per-command latency of the fake transport
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Build the registry; every instance starts out running
    pub async fn build(self) -> (Arc<ProcessRegistry>, Arc<FleetState>) {
        let state = Arc::new(FleetState::default());

        let mut config = FleetConfig::default();
        for (host, services) in &self.nodes {
            config.nodes.push(NodeEntry {
                host: host.clone(),
                services: services.clone(),
            });
            for service in services {
                state.set_running(host, service, true);
                config.services.entry(service.clone()).or_insert(ServiceEntry {
                    pid_path: Some(format!("/var/run/{}.pid", service)),
                    ..Default::default()
                });
            }
        }

        let topology = StaticTopology::from_config(&config);
        let latency = self.latency;
        let registry = {
            let state = state.clone();
            ProcessRegistry::build(&topology, &config, move |host| {
                Arc::new(FakeTransport {
                    host: host.to_string(),
                    state: state.clone(),
                    latency,
                }) as Arc<dyn RemoteExecutor>
            })
            .await
            .expect("fixture cluster must build")
        };

        (Arc::new(registry), state)
    }
}
