//! Route materialization: node path → coordinate sequence.

use serde::{Deserialize, Serialize};

use sr_core::GeoPoint;
use sr_graph::RoadGraph;

use crate::{PathResult, RouteError, RouteResult};

/// Ordered `{lat, lng}` points, one per node of a path.
///
/// Serializes as a bare JSON array.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializedRoute(pub Vec<GeoPoint>);

impl SerializedRoute {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.0
    }
}

/// Look up the position of every node on `path`, preserving order.
///
/// # Errors
///
/// [`RouteError::MissingNodeAttributes`] naming the first node that was
/// loaded without coordinates.
pub fn materialize(graph: &RoadGraph, path: &PathResult) -> RouteResult<SerializedRoute> {
    path.nodes
        .iter()
        .map(|&node| {
            graph
                .position(node)
                .ok_or(RouteError::MissingNodeAttributes { variant: path.variant, node })
        })
        .collect::<RouteResult<Vec<_>>>()
        .map(SerializedRoute)
}
