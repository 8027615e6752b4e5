//! Configuration model for the chaos engine
//!
//! The engine is driven by a single JSON document: a per-service table of
//! disruption settings plus the static node list consumed by the bundled
//! topology collector. Parsing is plain serde; semantic validation lives
//! with the component that consumes each field (registry, scheduler).

use crate::errors::SharedResult;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level configuration document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetConfig {
    /// Per-service disruption settings, keyed by service name
    #[serde(default)]
    pub services: BTreeMap<String, ServiceEntry>,

    /// Static topology: which services run on which hosts
    #[serde(default)]
    pub nodes: Vec<NodeEntry>,

    /// User for the ssh transport; defaults to the current user when unset
    #[serde(default)]
    pub ssh_user: Option<String>,
}

impl FleetConfig {
    /// Load and parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> SharedResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Settings for one service, if configured
    pub fn service(&self, name: &str) -> Option<&ServiceEntry> {
        self.services.get(name)
    }
}

/// One entry of the static node list
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeEntry {
    pub host: String,
    #[serde(default)]
    pub services: Vec<String>,
}

/// Disruption settings for one service
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    /// Path of the pid file on the remote host; required for the
    /// signal-based kill/terminate defaults
    #[serde(default)]
    pub pid_path: Option<String>,

    /// How lifecycle commands are issued for this service
    #[serde(default)]
    pub init: InitEntry,

    /// Scheduler period in seconds; the service is not scheduled without
    /// a positive value
    #[serde(default)]
    pub interval: Option<u64>,

    #[serde(default)]
    pub stop_probability: Option<f64>,
    #[serde(default)]
    pub kill_probability: Option<f64>,
    #[serde(default)]
    pub restart_probability: Option<f64>,

    /// Node-count bounds per scheduler iteration; negative values count
    /// from the end of the target list
    #[serde(default)]
    pub min_nodes_per_iteration: Option<i64>,
    #[serde(default)]
    pub max_nodes_per_iteration: Option<i64>,
}

/// Init style plus per-action command overrides
///
/// Any key other than `style` is treated as an override for the action of
/// that name, e.g. `{"style": "custom", "stop": "svcctl halt myservice"}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitEntry {
    #[serde(default)]
    pub style: InitStyle,

    #[serde(flatten)]
    pub overrides: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitStyle {
    #[default]
    Sysv,
    Custom,
}
