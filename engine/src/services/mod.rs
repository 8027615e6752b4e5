//! Service implementations
//!
//! Production implementations of the collaborator traits: an ssh-backed
//! command transport and a topology collector fed from the static node
//! list in configuration.

pub mod ssh;
pub mod topology;

pub use ssh::SshExecutor;
pub use topology::StaticTopology;
