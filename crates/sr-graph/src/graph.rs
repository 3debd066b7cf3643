//! Road multigraph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Edge arrays are sorted by `(from, to, parallel)` and indexed by `EdgeId`.
//! Parallel edges between one ordered node pair are therefore adjacent, and
//! every scan over a node's outgoing edges visits them in the same canonical
//! order.  Searches rely on both properties.
//!
//! # Immutability
//!
//! A built `RoadGraph` is never mutated.  Per-request data (risk scores and
//! weights) lives in overlays indexed by `EdgeId`, so one graph can be shared
//! behind an `Arc` by any number of concurrent requests.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lng)` to the nearest positioned node.
//! Nodes loaded without coordinates are routable but never resolved to.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use sr_core::{EdgeId, EdgeKey, GeoPoint, NodeId, RoadClass};

use crate::{GraphError, GraphResult};

/// Length assigned to an edge whose source data carries none.
pub const DEFAULT_EDGE_LENGTH_M: f64 = 1.0;

/// Upper bound on a single edge length, well beyond any real road segment.
/// Together with the bounded risk policy it keeps every path cost finite.
pub const MAX_EDGE_LENGTH_M: f64 = 1.0e8;

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lng]` point with
/// the associated `NodeId`.
#[derive(Clone, Debug)]
struct NodeEntry {
    point: [f64; 2], // [lat, lng]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared planar distance in degree space.  Good enough to pick the
    /// nearest node at city scale.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlng = self.point[1] - point[1];
        dlat * dlat + dlng * dlng
    }
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Directed road multigraph in CSR format plus a spatial index.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadGraphBuilder`].
#[derive(Debug)]
pub struct RoadGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each node, `None` when the source had no
    /// coordinates for it.  Indexed by `NodeId`.
    pub node_pos: Vec<Option<GeoPoint>>,

    /// Identifier of each node in the source data set (OSM id, CSV id).
    pub node_ref: Vec<i64>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,

    /// Parallel index within the `(from, to)` pair.
    pub edge_parallel: Vec<u16>,

    /// Length of each edge in metres.  Always finite and `> 0`.
    pub edge_length_m: Vec<f64>,

    pub edge_class: Vec<RoadClass>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
}

impl RoadGraph {
    /// Construct a graph with no nodes or edges.
    pub fn empty() -> Self {
        RoadGraphBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over every `EdgeId` in canonical order.
    #[inline]
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edge_count()).map(|i| EdgeId(i as u32))
    }

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`, sorted
    /// by `(to, parallel)`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Out-degree of `node`, counting parallel edges separately.
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// All parallel edges from `from` to `to`, in parallel-index order.
    pub fn parallel_edges(&self, from: NodeId, to: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_edges(from)
            .filter(move |e| self.edge_to[e.index()] == to)
    }

    /// `(from, to, parallel)` key of an edge.
    #[inline]
    pub fn edge_key(&self, edge: EdgeId) -> EdgeKey {
        EdgeKey {
            from:     self.edge_from[edge.index()],
            to:       self.edge_to[edge.index()],
            parallel: self.edge_parallel[edge.index()],
        }
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    /// Coordinates of `node`, or `None` if the node is unknown or was loaded
    /// without a position.
    #[inline]
    pub fn position(&self, node: NodeId) -> Option<GeoPoint> {
        self.node_pos.get(node.index()).copied().flatten()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Map an arbitrary coordinate to the nearest positioned node.
    ///
    /// Among equidistant candidates the lowest `NodeId` wins.  There is no
    /// distance cut-off: a point far outside the network still resolves to
    /// its closest node.
    ///
    /// # Errors
    ///
    /// [`GraphError::NoNodeFound`] if the graph has no positioned nodes.
    pub fn resolve(&self, pos: GeoPoint) -> GraphResult<NodeId> {
        let query = [pos.lat, pos.lng];
        let mut candidates = self.spatial_idx.nearest_neighbor_iter_with_distance_2(&query);

        let (first, best) = candidates.next().ok_or(GraphError::NoNodeFound)?;
        let mut winner = first.id;
        for (entry, d2) in candidates {
            if d2 > best {
                break;
            }
            winner = winner.min(entry.id);
        }
        Ok(winner)
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use sr_core::{GeoPoint, RoadClass};
/// use sr_graph::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new();
/// let a = b.add_node(GeoPoint::new(28.61, 77.20));
/// let c = b.add_node(GeoPoint::new(28.62, 77.21));
/// b.add_road(a, c, Some(1_200.0), RoadClass::Primary).unwrap();
/// let g = b.build();
/// assert_eq!(g.node_count(), 2);
/// assert_eq!(g.edge_count(), 2); // bidirectional
/// ```
pub struct RoadGraphBuilder {
    nodes:     Vec<Option<GeoPoint>>,
    refs:      Vec<i64>,
    raw_edges: Vec<RawEdge>,
    /// Next parallel index per ordered node pair.
    parallel:  FxHashMap<(NodeId, NodeId), u16>,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    parallel: u16,
    length_m: f64,
    class:    RoadClass,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            refs:      Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
            parallel:  FxHashMap::default(),
        }
    }

    /// Add a positioned node and return its `NodeId` (sequential from 0).
    /// The source reference defaults to the node's index.
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let next = self.nodes.len() as i64;
        self.add_node_with_ref(next, Some(pos))
    }

    /// Add a node that has no coordinates.  It takes part in searches but
    /// can never be resolved to, and a route through it cannot be
    /// materialized.
    pub fn add_node_without_position(&mut self) -> NodeId {
        let next = self.nodes.len() as i64;
        self.add_node_with_ref(next, None)
    }

    /// Add a node carrying its identifier from the source data set.
    /// Non-finite coordinates are recorded as missing.
    pub fn add_node_with_ref(&mut self, source_ref: i64, pos: Option<GeoPoint>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos.filter(|p| p.is_finite()));
        self.refs.push(source_ref);
        id
    }

    /// Add a **directed** edge and return its full key.
    ///
    /// `length_m = None` takes [`DEFAULT_EDGE_LENGTH_M`].
    ///
    /// # Errors
    ///
    /// - [`GraphError::NodeNotFound`] if either endpoint was never added.
    /// - [`GraphError::InvalidEdge`] if a supplied length is not in
    ///   `(0, MAX_EDGE_LENGTH_M]`.
    pub fn add_edge(
        &mut self,
        from:     NodeId,
        to:       NodeId,
        length_m: Option<f64>,
        class:    RoadClass,
    ) -> GraphResult<EdgeKey> {
        for node in [from, to] {
            if node.index() >= self.nodes.len() {
                return Err(GraphError::NodeNotFound(node));
            }
        }
        let length_m = match length_m {
            None => DEFAULT_EDGE_LENGTH_M,
            Some(l) if l > 0.0 && l <= MAX_EDGE_LENGTH_M => l,
            Some(l) => {
                return Err(GraphError::InvalidEdge {
                    from,
                    to,
                    reason: format!("length must be in (0, {MAX_EDGE_LENGTH_M}], got {l}"),
                });
            }
        };

        let slot = self.parallel.entry((from, to)).or_insert(0);
        let parallel = *slot;
        *slot = slot.checked_add(1).ok_or_else(|| GraphError::InvalidEdge {
            from,
            to,
            reason: "too many parallel edges".to_string(),
        })?;

        self.raw_edges.push(RawEdge { from, to, parallel, length_m, class });
        Ok(EdgeKey { from, to, parallel })
    }

    /// Convenience: add edges in **both directions** for a two-way segment.
    pub fn add_road(
        &mut self,
        a:        NodeId,
        b:        NodeId,
        length_m: Option<f64>,
        class:    RoadClass,
    ) -> GraphResult<()> {
        self.add_edge(a, b, length_m, class)?;
        self.add_edge(b, a, length_m, class)?;
        Ok(())
    }

    /// Position of a node added earlier (used by loaders to derive edge
    /// lengths from geometry).
    pub fn node_pos(&self, id: NodeId) -> Option<GeoPoint> {
        self.nodes.get(id.index()).copied().flatten()
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce an immutable [`RoadGraph`].
    ///
    /// Time complexity: O(E log E) for the edge sort + O(N log N) for the
    /// R-tree bulk load.
    pub fn build(self) -> RoadGraph {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // Canonical order: source, then destination, then parallel index.
        let mut raw = self.raw_edges;
        raw.sort_unstable_by_key(|e| (e.from, e.to, e.parallel));

        let edge_from:     Vec<NodeId>    = raw.iter().map(|e| e.from).collect();
        let edge_to:       Vec<NodeId>    = raw.iter().map(|e| e.to).collect();
        let edge_parallel: Vec<u16>       = raw.iter().map(|e| e.parallel).collect();
        let edge_length_m: Vec<f64>       = raw.iter().map(|e| e.length_m).collect();
        let edge_class:    Vec<RoadClass> = raw.iter().map(|e| e.class).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, pos)| {
                pos.map(|p| NodeEntry { point: [p.lat, p.lng], id: NodeId(i as u32) })
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        RoadGraph {
            node_pos: self.nodes,
            node_ref: self.refs,
            node_out_start,
            edge_from,
            edge_to,
            edge_parallel,
            edge_length_m,
            edge_class,
            spatial_idx,
        }
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
