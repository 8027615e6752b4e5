//! Core vocabulary shared between the engine and its front ends

use crate::errors::SharedError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// A disruption that can be applied to a service instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Start,
    Restart,
    Stop,
    Terminate,
    Kill,
    RollingRestart,
}

impl Action {
    /// Every action the engine knows about, used to size the guard table
    pub const ALL: [Action; 6] = [
        Action::Start,
        Action::Restart,
        Action::Stop,
        Action::Terminate,
        Action::Kill,
        Action::RollingRestart,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Restart => "restart",
            Action::Stop => "stop",
            Action::Terminate => "terminate",
            Action::Kill => "kill",
            Action::RollingRestart => "rolling-restart",
        }
    }

    /// True for the actions that bring a running instance down
    /// (stop/terminate/kill, not restart)
    pub fn is_halting(&self) -> bool {
        matches!(self, Action::Stop | Action::Terminate | Action::Kill)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Action::Start),
            "restart" => Ok(Action::Restart),
            "stop" => Ok(Action::Stop),
            "terminate" => Ok(Action::Terminate),
            "kill" => Ok(Action::Kill),
            "rolling-restart" => Ok(Action::RollingRestart),
            other => Err(SharedError::UnknownAction {
                input: other.to_string(),
            }),
        }
    }
}

/// Observed run state of one service instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Running,
    Stopped,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceState::Running => f.write_str("running"),
            ServiceState::Stopped => f.write_str("stopped"),
        }
    }
}

/// One host and the set of services the topology collector found on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeProperties {
    pub host: String,
    pub services: BTreeSet<String>,
}

/// Point-in-time run state of every service on one host
///
/// Never cached; the aggregator recomputes it per query.
#[derive(Debug, Clone, Serialize)]
pub struct NodeStatus {
    pub host: String,
    pub services: BTreeMap<String, ServiceState>,
    pub observed_at: DateTime<Utc>,
}

/// Snapshot of the disruption guard for one (service, action) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionStatus {
    pub service: String,
    pub action: Action,
    pub running: bool,
}
