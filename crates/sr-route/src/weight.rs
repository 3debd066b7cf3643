//! Edge weight functions, one per route variant.
//!
//! A search never reads edge attributes directly; it asks an [`EdgeWeight`]
//! for the cost of each edge it relaxes.  The fast variant reads the
//! immutable `length`, the safe variant reads the per-request
//! [`RiskOverlay`], and both see the same graph snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};

use sr_core::EdgeId;
use sr_graph::RoadGraph;
use sr_risk::RiskOverlay;

// ── RouteVariant ──────────────────────────────────────────────────────────────

/// Which of the two paths a result or error belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteVariant {
    /// Shortest by `length`.
    Fast,
    /// Shortest by `risk_weight`.
    Safe,
}

impl RouteVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteVariant::Fast => "fast",
            RouteVariant::Safe => "safe",
        }
    }
}

impl fmt::Display for RouteVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── EdgeWeight trait ──────────────────────────────────────────────────────────

/// Cost of traversing one edge.
///
/// Implementations must be `Sync` so the two searches of a request can run
/// on different threads.  Returned weights must be finite and non-negative;
/// the search checks this before it starts.
pub trait EdgeWeight: Sync {
    fn weight(&self, graph: &RoadGraph, edge: EdgeId) -> f64;
}

/// Physical length in metres.
#[derive(Copy, Clone, Debug, Default)]
pub struct LengthWeight;

impl EdgeWeight for LengthWeight {
    #[inline]
    fn weight(&self, graph: &RoadGraph, edge: EdgeId) -> f64 {
        graph.edge_length_m[edge.index()]
    }
}

/// Risk weight from a per-request overlay built over the same graph.
#[derive(Copy, Clone, Debug)]
pub struct RiskWeight<'a>(pub &'a RiskOverlay);

impl EdgeWeight for RiskWeight<'_> {
    #[inline]
    fn weight(&self, _graph: &RoadGraph, edge: EdgeId) -> f64 {
        self.0.risk_weight(edge)
    }
}
