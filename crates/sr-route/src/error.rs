use sr_core::{CoreError, EdgeKey, GeoPoint, NodeId};
use sr_graph::GraphError;
use thiserror::Error;

use crate::RouteVariant;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("graph has no positioned nodes to resolve {0} against")]
    NoNodeFound(GeoPoint),

    #[error("invalid coordinate {0}: latitude and longitude must be finite")]
    InvalidCoordinate(GeoPoint),

    #[error("{variant} route: no path from {from} to {to}")]
    NoPathExists {
        variant: RouteVariant,
        from:    NodeId,
        to:      NodeId,
    },

    #[error("{variant} route: node {node} has no coordinates")]
    MissingNodeAttributes {
        variant: RouteVariant,
        node:    NodeId,
    },

    #[error("{variant} route: edge {edge} has weight {weight}; weights must be finite and >= 0")]
    InvalidWeight {
        variant: RouteVariant,
        edge:    EdgeKey,
        weight:  f64,
    },

    #[error("request cancelled")]
    Cancelled,

    #[error("both route variants failed: fast: {fast}; safe: {safe}")]
    AllVariantsFailed {
        fast: Box<RouteError>,
        safe: Box<RouteError>,
    },

    #[error("engine configuration error: {0}")]
    Config(String),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Context(#[from] CoreError),
}

impl RouteError {
    /// Stable snake_case name used as the error marker in responses.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::NoNodeFound(_)                => "no_node_found",
            RouteError::InvalidCoordinate(_)          => "invalid_coordinate",
            RouteError::NoPathExists { .. }           => "no_path_exists",
            RouteError::MissingNodeAttributes { .. }  => "missing_node_attributes",
            RouteError::InvalidWeight { .. }          => "invalid_weight",
            RouteError::Cancelled                     => "cancelled",
            RouteError::AllVariantsFailed { .. }      => "all_variants_failed",
            RouteError::Config(_)                     => "config",
            RouteError::Graph(_)                      => "graph",
            RouteError::Context(_)                    => "invalid_context",
        }
    }
}

pub type RouteResult<T> = Result<T, RouteError>;
