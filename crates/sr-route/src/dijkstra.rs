//! Dijkstra search over the CSR road multigraph.
//!
//! # Parallel edges
//!
//! Outgoing edges are stored sorted by `(to, parallel)`, so the parallel
//! edges towards one neighbour form a contiguous run.  Each run is collapsed
//! to its minimum-weight edge under the search's own weight function before
//! relaxation; on equal weights the lowest parallel index is kept.  The fast
//! and safe searches may therefore traverse different physical segments
//! between the same two nodes, each the cheapest for its own cost.
//!
//! # Determinism
//!
//! Heap entries are keyed by `(cost, NodeId)`, so equal-cost nodes settle in
//! ascending id order.  A node's predecessor is only replaced on a strictly
//! cheaper cost, so among equal-cost paths the first one discovered in that
//! canonical order wins.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use log::debug;

use sr_core::{EdgeId, NodeId};
use sr_graph::{GraphError, RoadGraph};

use crate::{CancelToken, EdgeWeight, RouteError, RouteResult, RouteVariant};

// ── Path ──────────────────────────────────────────────────────────────────────

/// Raw search output.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Visited nodes, start first, end last.  Never empty.
    pub nodes: Vec<NodeId>,
    /// The edge taken between each consecutive pair of `nodes`.
    pub edges: Vec<EdgeId>,
    /// Sum of the search's edge weights along `edges`.
    pub cost: f64,
}

impl Path {
    fn trivial(node: NodeId) -> Self {
        Self { nodes: vec![node], edges: Vec::new(), cost: 0.0 }
    }
}

// ── Cost ──────────────────────────────────────────────────────────────────────

/// Heap key.  Weights are validated before the search, so every cost is a
/// finite non-negative number and `total_cmp` is a plain numeric order.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// ── Search ────────────────────────────────────────────────────────────────────

/// Reject any edge whose weight is negative or not finite.
pub fn validate_weights<W: EdgeWeight + ?Sized>(
    graph:   &RoadGraph,
    weight:  &W,
    variant: RouteVariant,
) -> RouteResult<()> {
    for edge in graph.edges() {
        let w = weight.weight(graph, edge);
        if !w.is_finite() || w < 0.0 {
            return Err(RouteError::InvalidWeight { variant, edge: graph.edge_key(edge), weight: w });
        }
    }
    Ok(())
}

/// Shortest path from `from` to `to` under `weight`.
///
/// `from == to` returns the single-node path without searching.
///
/// # Errors
///
/// - [`RouteError::Graph`] if either endpoint is not a node of `graph`.
/// - [`RouteError::InvalidWeight`] if any edge has an unusable weight.
/// - [`RouteError::Cancelled`] if `cancel` fires during the search.
/// - [`RouteError::NoPathExists`] if `to` is unreachable from `from`.
pub fn shortest_path<W: EdgeWeight + ?Sized>(
    graph:   &RoadGraph,
    weight:  &W,
    variant: RouteVariant,
    from:    NodeId,
    to:      NodeId,
    cancel:  &CancelToken,
) -> RouteResult<Path> {
    for node in [from, to] {
        if !graph.contains(node) {
            return Err(GraphError::NodeNotFound(node).into());
        }
    }
    if from == to {
        return Ok(Path::trivial(from));
    }
    validate_weights(graph, weight, variant)?;

    let n = graph.node_count();
    // dist[v] = best known cost to reach v.
    let mut dist      = vec![f64::INFINITY; n];
    // prev_edge[v] = EdgeId that reached v; EdgeId::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];
    let mut settled   = 0usize;

    dist[from.index()] = 0.0;

    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), from)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if cancel.is_cancelled() {
            debug!("{variant} search cancelled after settling {settled} nodes");
            return Err(RouteError::Cancelled);
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }
        settled += 1;

        if node == to {
            debug!("{variant} search settled {settled} of {n} nodes, cost {cost:.3}");
            return Ok(reconstruct(graph, &prev_edge, from, to, cost));
        }

        let mut out = graph.out_edges(node).peekable();
        while let Some(first) = out.next() {
            let neighbor = graph.edge_to[first.index()];

            // Collapse the parallel run towards `neighbor` to its cheapest edge.
            let mut best   = first;
            let mut best_w = weight.weight(graph, first);
            while let Some(edge) = out.next_if(|e| graph.edge_to[e.index()] == neighbor) {
                let w = weight.weight(graph, edge);
                if w < best_w {
                    best   = edge;
                    best_w = w;
                }
            }

            let new_cost = cost + best_w;
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()]      = new_cost;
                prev_edge[neighbor.index()] = best;
                heap.push(Reverse((Cost(new_cost), neighbor)));
            }
        }
    }

    debug!("{variant} search exhausted {settled} reachable nodes without reaching {to}");
    Err(RouteError::NoPathExists { variant, from, to })
}

fn reconstruct(
    graph:     &RoadGraph,
    prev_edge: &[EdgeId],
    from:      NodeId,
    to:        NodeId,
    cost:      f64,
) -> Path {
    let mut edges = Vec::new();
    let mut nodes = vec![to];
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        debug_assert!(e.is_valid(), "settled node {cur} has no predecessor");
        edges.push(e);
        cur = graph.edge_from[e.index()];
        nodes.push(cur);
    }
    edges.reverse();
    nodes.reverse();
    Path { nodes, edges, cost }
}
