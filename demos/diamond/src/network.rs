//! Diamond-shaped river crossing network.
//!
//! Two ways from the riverside to the market: a short low road that hugs
//! the river (service class on its second half) and a longer road over the
//! northern bridge.  The first leg of the low road is a divided carriageway,
//! so it appears as two parallel edges in each direction.

use sr_core::{GeoPoint, NodeId, RoadClass};
use sr_graph::{GraphResult, RoadGraph, RoadGraphBuilder};

/// Returns `(graph, [riverside, north_bridge, low_road, market])`.
pub fn build_network() -> GraphResult<(RoadGraph, [NodeId; 4])> {
    let mut b = RoadGraphBuilder::new();

    let riverside    = b.add_node(GeoPoint::new(28.6100, 77.2000));
    let north_bridge = b.add_node(GeoPoint::new(28.6190, 77.2050));
    let low_road     = b.add_node(GeoPoint::new(28.6080, 77.2100));
    let market       = b.add_node(GeoPoint::new(28.6150, 77.2180));

    b.add_road(riverside,    north_bridge, Some(1_100.0), RoadClass::Primary)?;
    b.add_road(north_bridge, market,       Some(1_400.0), RoadClass::Primary)?;
    b.add_road(riverside,    low_road,     Some(  950.0), RoadClass::Secondary)?;
    b.add_road(riverside,    low_road,     Some(1_020.0), RoadClass::Tertiary)?;
    b.add_road(low_road,     market,       Some(1_050.0), RoadClass::Service)?;

    Ok((b.build(), [riverside, north_bridge, low_road, market]))
}
