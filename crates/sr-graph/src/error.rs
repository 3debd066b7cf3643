//! Graph-subsystem error type.

use thiserror::Error;

use sr_core::NodeId;

/// Errors produced by `sr-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The graph has no positioned node to resolve a coordinate to.
    #[error("no node found: graph has no positioned nodes")]
    NoNodeFound,

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("invalid edge {from} -> {to}: {reason}")]
    InvalidEdge {
        from:   NodeId,
        to:     NodeId,
        reason: String,
    },

    #[error("graph parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
