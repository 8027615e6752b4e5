//! Static topology collector
//!
//! The simplest discovery plugin: the host -> services mapping comes
//! straight from the node list in the configuration file.

use crate::error::EngineResult;
use crate::traits::TopologyCollector;
use async_trait::async_trait;
use shared::{FleetConfig, NodeProperties};

#[derive(Debug, Clone)]
pub struct StaticTopology {
    nodes: Vec<NodeProperties>,
}

impl StaticTopology {
    pub fn from_config(config: &FleetConfig) -> Self {
        let nodes = config
            .nodes
            .iter()
            .map(|node| NodeProperties {
                host: node.host.clone(),
                services: node.services.iter().cloned().collect(),
            })
            .collect();
        Self { nodes }
    }
}

#[async_trait]
impl TopologyCollector for StaticTopology {
    async fn node_properties(&self) -> EngineResult<Vec<NodeProperties>> {
        Ok(self.nodes.clone())
    }
}
