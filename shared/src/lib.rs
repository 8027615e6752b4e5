//! Shared types for the chaos engine
//!
//! Contains the types that cross the boundary between the engine core and
//! its front ends: disruption actions, status snapshots, the configuration
//! model, and the logging bootstrap.

pub mod config;
pub mod errors;
pub mod logging;
pub mod types;

pub use config::{FleetConfig, InitEntry, InitStyle, NodeEntry, ServiceEntry};
pub use errors::*;
pub use types::*;
