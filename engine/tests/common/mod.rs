//! Shared test infrastructure for engine integration tests

pub mod fixtures;
pub mod helpers;

pub use fixtures::TestFixtures;
pub use helpers::{ClusterBuilder, FleetState};
