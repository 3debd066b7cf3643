//! Edge feature encoding.
//!
//! The oracle sees one flat numeric record per edge: the edge's own
//! attributes followed by every context signal.  Booleans are encoded as
//! `0.0` / `1.0`.  Field order matches [`FEATURE_NAMES`] and never changes,
//! since trained models depend on it.

use std::collections::BTreeMap;

use serde::Serialize;

use sr_core::{Context, EdgeId, RoadClass};
use sr_graph::RoadGraph;

/// Column names in model input order.
pub const FEATURE_NAMES: [&str; 12] = [
    "length",
    "road_type",
    "elevation",
    "flood_reports",
    "traffic_speed",
    "water_depth",
    "road_width",
    "visibility",
    "crowd_density",
    "is_bridge",
    "near_river",
    "blocked",
];

/// Numeric input record for one `(edge, context)` pair.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct FeatureVector {
    pub length:        f64,
    /// [`RoadClass::capacity_rank`] of the edge.
    pub road_type:     f64,
    pub elevation:     f64,
    pub flood_reports: f64,
    pub traffic_speed: f64,
    pub water_depth:   f64,
    pub road_width:    f64,
    pub visibility:    f64,
    pub crowd_density: f64,
    pub is_bridge:     f64,
    pub near_river:    f64,
    pub blocked:       f64,
}

#[inline]
fn indicator(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

impl FeatureVector {
    pub fn new(length_m: f64, class: RoadClass, ctx: &Context) -> Self {
        Self {
            length:        length_m,
            road_type:     class.capacity_rank(),
            elevation:     ctx.elevation,
            flood_reports: ctx.flood_reports,
            traffic_speed: ctx.traffic_speed,
            water_depth:   ctx.water_depth,
            road_width:    ctx.road_width,
            visibility:    ctx.visibility,
            crowd_density: ctx.crowd_density,
            is_bridge:     indicator(ctx.is_bridge),
            near_river:    indicator(ctx.near_river),
            blocked:       indicator(ctx.blocked),
        }
    }

    /// Encode `edge` of `graph` under `ctx`.
    #[inline]
    pub fn for_edge(graph: &RoadGraph, edge: EdgeId, ctx: &Context) -> Self {
        Self::new(graph.edge_length_m[edge.index()], graph.edge_class[edge.index()], ctx)
    }

    /// Values in [`FEATURE_NAMES`] order.
    pub fn as_array(&self) -> [f64; 12] {
        [
            self.length,
            self.road_type,
            self.elevation,
            self.flood_reports,
            self.traffic_speed,
            self.water_depth,
            self.road_width,
            self.visibility,
            self.crowd_density,
            self.is_bridge,
            self.near_river,
            self.blocked,
        ]
    }

    /// Name → value view, for oracles keyed by column name.
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        FEATURE_NAMES.into_iter().zip(self.as_array()).collect()
    }
}
