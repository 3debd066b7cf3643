//! CSV road-graph loader.
//!
//! # CSV format
//!
//! Two files.  Nodes:
//!
//! ```csv
//! id,lat,lng
//! 1001,28.6139,77.2090
//! 1002,28.6150,77.2101
//! 1003,,
//! ```
//!
//! Blank `lat`/`lng` loads the node without a position.  Edges (directed):
//!
//! ```csv
//! from,to,length,road_class
//! 1001,1002,152.4,primary
//! 1002,1001,152.4,primary
//! 1002,1003,,residential
//! ```
//!
//! A blank `length` takes [`DEFAULT_EDGE_LENGTH_M`](crate::graph::DEFAULT_EDGE_LENGTH_M);
//! a blank or unrecognised `road_class` is `unknown`.  Repeated
//! `(from, to)` rows become parallel edges in file order.
//!
//! Nodes are added in ascending `id` order regardless of file order, so
//! `NodeId` order (and with it every tie-break) follows the source ids.

use std::io::Read;
use std::path::Path;

use log::info;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use sr_core::{GeoPoint, NodeId, RoadClass};

use crate::graph::{RoadGraph, RoadGraphBuilder};
use crate::{GraphError, GraphResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    id:  i64,
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Deserialize)]
struct EdgeRecord {
    from:       i64,
    to:         i64,
    length:     Option<f64>,
    road_class: Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a road graph from a node CSV and an edge CSV on disk.
pub fn load_graph_csv(nodes: &Path, edges: &Path) -> GraphResult<RoadGraph> {
    let nodes = std::fs::File::open(nodes)?;
    let edges = std::fs::File::open(edges)?;
    load_graph_readers(nodes, edges)
}

/// Like [`load_graph_csv`] but accepts any `Read` sources.
///
/// # Errors
///
/// [`GraphError::Parse`] on malformed rows, duplicate node ids, or edges
/// referencing unknown nodes; [`GraphError::InvalidEdge`] on non-positive
/// lengths.
pub fn load_graph_readers<N: Read, E: Read>(nodes: N, edges: E) -> GraphResult<RoadGraph> {
    // ── Nodes ─────────────────────────────────────────────────────────────
    let mut node_rows: Vec<NodeRecord> = csv::Reader::from_reader(nodes)
        .deserialize::<NodeRecord>()
        .collect::<Result<_, _>>()
        .map_err(|e| GraphError::Parse(e.to_string()))?;
    node_rows.sort_unstable_by_key(|r| r.id);

    let mut builder = RoadGraphBuilder::with_capacity(node_rows.len(), node_rows.len() * 2);
    let mut by_ref: FxHashMap<i64, NodeId> = FxHashMap::default();
    by_ref.reserve(node_rows.len());

    for row in node_rows {
        let pos = match (row.lat, row.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            (None, None) => None,
            _ => {
                return Err(GraphError::Parse(format!(
                    "node {}: lat and lng must both be present or both blank",
                    row.id
                )));
            }
        };
        let id = builder.add_node_with_ref(row.id, pos);
        if by_ref.insert(row.id, id).is_some() {
            return Err(GraphError::Parse(format!("duplicate node id {}", row.id)));
        }
    }

    // ── Edges ─────────────────────────────────────────────────────────────
    let lookup = |r: i64| {
        by_ref
            .get(&r)
            .copied()
            .ok_or_else(|| GraphError::Parse(format!("edge references unknown node {r}")))
    };

    for result in csv::Reader::from_reader(edges).deserialize::<EdgeRecord>() {
        let row = result.map_err(|e| GraphError::Parse(e.to_string()))?;
        let class = row
            .road_class
            .as_deref()
            .map_or(RoadClass::Unknown, |s| RoadClass::from_highway(&s.to_ascii_lowercase()));
        builder.add_edge(lookup(row.from)?, lookup(row.to)?, row.length, class)?;
    }

    let graph = builder.build();
    info!(
        "loaded road graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}
