//! OSM PBF loader, enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use sr_graph::osm::load_from_pbf;
//!
//! let graph = load_from_pbf(Path::new("delhi.osm.pbf"))?;
//! ```
//!
//! # What is loaded
//!
//! Only drivable `highway=*` ways (see [`is_drivable`]).  Each consecutive
//! node pair of a way becomes one edge, or two for two-way roads, carrying
//! the way's [`RoadClass`] and its haversine length.  Two ways sharing the
//! same node pair produce parallel edges.
//!
//! Road nodes are added in ascending OSM id order so `NodeId` order is
//! stable across runs on the same extract.

use std::collections::HashMap;
use std::path::Path;

use log::{info, warn};
use osmpbf::{Element, ElementReader};

use sr_core::{GeoPoint, NodeId, RoadClass};

use crate::graph::{RoadGraph, RoadGraphBuilder};
use crate::{GraphError, GraphResult};

// ── Public entry point ────────────────────────────────────────────────────────

/// Load a drivable road graph from an OSM PBF file.
///
/// # Errors
///
/// Returns [`GraphError::Osm`] if the file cannot be opened or parsed, and
/// [`GraphError::InvalidEdge`] if a way yields an unusable segment.
pub fn load_from_pbf(path: &Path) -> GraphResult<RoadGraph> {
    // ── Pass 1: all node positions + drivable ways ────────────────────────
    let reader = ElementReader::from_path(path).map_err(|e| GraphError::Osm(e.to_string()))?;

    let mut all_nodes: HashMap<i64, GeoPoint> = HashMap::new();
    let mut road_ways: Vec<OsmWay> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::DenseNode(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::Way(w) => {
                let tags: Vec<(&str, &str)> = w.tags().collect();
                let Some(highway) = tag(&tags, "highway") else { return };
                if !is_drivable(highway) {
                    return;
                }
                road_ways.push(OsmWay {
                    refs:   w.refs().collect(),
                    class:  RoadClass::from_highway(highway),
                    oneway: is_oneway(highway, &tags),
                });
            }
            _ => {}
        })
        .map_err(|e| GraphError::Osm(e.to_string()))?;

    // ── Pass 2: road-referenced nodes in ascending OSM id order ───────────
    let mut road_refs: Vec<i64> = road_ways
        .iter()
        .flat_map(|w| w.refs.iter().copied())
        .collect();
    road_refs.sort_unstable();
    road_refs.dedup();

    let mut builder = RoadGraphBuilder::with_capacity(road_refs.len(), road_refs.len() * 2);
    let mut osm_to_sr: HashMap<i64, NodeId> = HashMap::with_capacity(road_refs.len());

    let mut missing = 0usize;
    for osm_id in &road_refs {
        match all_nodes.get(osm_id) {
            Some(&pos) => {
                osm_to_sr.insert(*osm_id, builder.add_node_with_ref(*osm_id, Some(pos)));
            }
            None => missing += 1,
        }
    }
    if missing > 0 {
        warn!("{missing} way nodes missing from extract; their segments are dropped");
    }
    drop(all_nodes);

    // ── Pass 3: edges ─────────────────────────────────────────────────────
    for way in &road_ways {
        for window in way.refs.windows(2) {
            let (Some(&from), Some(&to)) = (osm_to_sr.get(&window[0]), osm_to_sr.get(&window[1]))
            else {
                continue;
            };
            if from == to {
                continue;
            }
            let length = match (builder.node_pos(from), builder.node_pos(to)) {
                (Some(a), Some(b)) => Some(a.distance_m(b)).filter(|l| *l > 0.0),
                _ => None,
            };
            if way.oneway {
                builder.add_edge(from, to, length, way.class)?;
            } else {
                builder.add_road(from, to, length, way.class)?;
            }
        }
    }

    let graph = builder.build();
    info!(
        "loaded OSM road graph from {}: {} nodes, {} edges",
        path.display(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

// ── Internal types ────────────────────────────────────────────────────────────

struct OsmWay {
    refs:   Vec<i64>,
    class:  RoadClass,
    oneway: bool,
}

// ── Tag helpers ───────────────────────────────────────────────────────────────

fn tag<'a>(tags: &[(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// `false` for `highway` values that carry no motor traffic.
fn is_drivable(highway: &str) -> bool {
    !matches!(
        highway,
        "footway" | "path" | "cycleway" | "pedestrian" | "steps" | "track"
            | "bridleway" | "corridor" | "proposed" | "construction"
    )
}

/// Motorways are implicitly one-way in OSM convention.
fn is_oneway(highway: &str, tags: &[(&str, &str)]) -> bool {
    let explicit = matches!(tag(tags, "oneway"), Some("yes" | "1" | "true"));
    let implicit = matches!(highway, "motorway" | "motorway_link");
    explicit || implicit
}
