//! Dual path solver: one fast search and one safe search per request.

use serde::{Deserialize, Serialize};

use sr_core::{EdgeId, NodeId};
use sr_graph::RoadGraph;
use sr_risk::RiskOverlay;

use crate::dijkstra::{Path, shortest_path};
use crate::{CancelToken, EdgeWeight, LengthWeight, RiskWeight, RouteResult, RouteVariant};

// ── PathResult ────────────────────────────────────────────────────────────────

/// Totals over the edges a path actually traverses.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteStats {
    /// Sum of edge lengths, metres.
    pub total_length:      f64,
    /// Sum of risk weights from the request's overlay.
    pub total_risk_weight: f64,
    /// Number of nodes on the path.
    pub node_count:        usize,
}

/// A solved path for one variant.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    pub variant: RouteVariant,
    /// Start node first, end node last.  Consecutive nodes share `edges[i]`.
    pub nodes:   Vec<NodeId>,
    pub edges:   Vec<EdgeId>,
    pub stats:   RouteStats,
}

impl PathResult {
    fn new(graph: &RoadGraph, overlay: &RiskOverlay, variant: RouteVariant, path: Path) -> Self {
        let total_length = path.edges.iter().map(|&e| graph.edge_length_m[e.index()]).sum();
        let total_risk_weight = path.edges.iter().map(|&e| overlay.risk_weight(e)).sum();
        Self {
            variant,
            stats: RouteStats { total_length, total_risk_weight, node_count: path.nodes.len() },
            nodes: path.nodes,
            edges: path.edges,
        }
    }

    pub fn start(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn end(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// `true` for the single-node path of a request whose endpoints resolve
    /// to the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Independent outcomes of the two searches.
#[derive(Debug)]
pub struct DualPaths {
    pub fast: RouteResult<PathResult>,
    pub safe: RouteResult<PathResult>,
}

// ── DualPathSolver ────────────────────────────────────────────────────────────

/// Runs both searches over one graph snapshot and one risk overlay.
///
/// The overlay must have been attached to `graph`; it supplies the safe
/// weights and the `total_risk_weight` statistic of both results.
pub struct DualPathSolver<'a> {
    graph:    &'a RoadGraph,
    overlay:  &'a RiskOverlay,
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    parallel: bool,
}

impl<'a> DualPathSolver<'a> {
    pub fn new(graph: &'a RoadGraph, overlay: &'a RiskOverlay) -> Self {
        debug_assert_eq!(overlay.len(), graph.edge_count(), "overlay built for another graph");
        Self { graph, overlay, parallel: false }
    }

    /// Run the two searches concurrently.  Has no effect unless the crate
    /// is built with the `parallel` feature.
    pub fn parallel(mut self, yes: bool) -> Self {
        self.parallel = yes;
        self
    }

    /// Solve one variant.
    pub fn solve_variant(
        &self,
        variant: RouteVariant,
        from:    NodeId,
        to:      NodeId,
        cancel:  &CancelToken,
    ) -> RouteResult<PathResult> {
        let path = match variant {
            RouteVariant::Fast => self.search(&LengthWeight, variant, from, to, cancel)?,
            RouteVariant::Safe => self.search(&RiskWeight(self.overlay), variant, from, to, cancel)?,
        };
        Ok(PathResult::new(self.graph, self.overlay, variant, path))
    }

    /// Solve both variants.  Neither outcome affects the other.
    pub fn solve(&self, from: NodeId, to: NodeId, cancel: &CancelToken) -> DualPaths {
        let fast = || self.solve_variant(RouteVariant::Fast, from, to, cancel);
        let safe = || self.solve_variant(RouteVariant::Safe, from, to, cancel);

        #[cfg(feature = "parallel")]
        let (fast, safe) = if self.parallel { rayon::join(fast, safe) } else { (fast(), safe()) };
        #[cfg(not(feature = "parallel"))]
        let (fast, safe) = (fast(), safe());

        DualPaths { fast, safe }
    }

    fn search<W: EdgeWeight>(
        &self,
        weight:  &W,
        variant: RouteVariant,
        from:    NodeId,
        to:      NodeId,
        cancel:  &CancelToken,
    ) -> RouteResult<Path> {
        shortest_path(self.graph, weight, variant, from, to, cancel)
    }
}
