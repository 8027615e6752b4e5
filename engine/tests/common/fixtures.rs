//! Test fixtures and data for engine integration tests

/// Standard hosts and services used across the suites
pub struct TestFixtures;

impl TestFixtures {
    pub const HOST_1: &'static str = "10.0.0.5";
    pub const HOST_2: &'static str = "10.0.0.6";
    pub const HOST_3: &'static str = "10.0.0.7";

    pub const SVC_A: &'static str = "svc-a";
    pub const SVC_B: &'static str = "svc-b";

    /// An address no fixture cluster ever registers
    pub const UNKNOWN_HOST: &'static str = "10.0.0.99";
}
