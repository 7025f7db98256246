use crate::ir::EdgeDescriptor;
use serde::Serialize;

pub const INTERNAL_EDGE_TYPE: &str = "SSIS";
pub const INTERNAL_EDGE_STATE: &str = "Ready";

/// Directed edge between two nodes. Endpoints are ids, resolved through the
/// graph index when drawn; an edge never owns its nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub edge_type: String,
    pub state: String,
    pub is_active: bool,
    /// Created by an adapter mode rather than read from the input.
    pub synthesized: bool,
}

impl Edge {
    pub fn from_descriptor(descriptor: EdgeDescriptor) -> Self {
        Self {
            source: descriptor.source,
            target: descriptor.target,
            edge_type: descriptor.edge_type,
            state: descriptor.state,
            is_active: descriptor.is_active,
            synthesized: false,
        }
    }

    pub fn internal(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            edge_type: INTERNAL_EDGE_TYPE.to_string(),
            state: INTERNAL_EDGE_STATE.to_string(),
            is_active: true,
            synthesized: true,
        }
    }
}
