//! Chaos engine for validating operational resilience
//!
//! Deliberately disrupts service instances across a fleet of hosts:
//! stop, kill, terminate, restart, and rolling restart, triggered on
//! demand through the executor or continuously by the scheduled chaos
//! loop, with per-host status aggregation for observing the damage.

pub mod error;
pub mod executor;
pub mod guard;
pub mod handle;
pub mod registry;
pub mod rolling;
pub mod scheduler;
pub mod selector;
pub mod services;
pub mod status;
pub mod traits;

// Re-export commonly used types
pub use error::{EngineError, EngineResult};
pub use executor::{DisruptionExecutor, ExtraArgs};
pub use guard::DisruptionGuard;
pub use handle::RemoteProcessHandle;
pub use registry::ProcessRegistry;
pub use rolling::rolling_restart;
pub use scheduler::{schedules_from_config, ChaosScheduler, ScheduledServiceConfig};
pub use selector::{select, SelectionRequest, SelectionSpec};
pub use status::StatusAggregator;
pub use traits::{RemoteExecutor, TopologyCollector};
