//! Trait seams for the external collaborators
//!
//! The engine depends on two collaborators it does not implement itself:
//! the remote command transport and the cluster topology discovery. Both
//! are defined here as injectable traits with mockall mock generation so
//! the core can be tested without a live cluster.

use crate::error::EngineResult;
use shared::NodeProperties;

/// Remote command execution capability for one host
///
/// One executor is injected per handle. `Err` is reserved for
/// transport-level failures (connection refused, session torn down,
/// killed by signal); a command that ran to completion and exited
/// non-zero is `Ok` with that exit code.
#[mockall::automock]
#[async_trait::async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Run a shell command on the remote host and return its exit code
    async fn run_command(&self, command: &str) -> EngineResult<i32>;
}

/// Cluster topology discovery
///
/// Produces the host -> services mapping the registry is built from.
/// Invoked once at startup; the registry never re-discovers.
#[mockall::automock]
#[async_trait::async_trait]
pub trait TopologyCollector: Send + Sync {
    async fn node_properties(&self) -> EngineResult<Vec<NodeProperties>>;
}
