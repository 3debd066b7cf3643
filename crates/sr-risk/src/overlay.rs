//! Per-request risk overlay.
//!
//! The overlay is the only place risk data lives.  It is indexed by `EdgeId`
//! over an immutable [`RoadGraph`](sr_graph::RoadGraph) and owned by exactly
//! one request, so concurrent requests with different contexts never see
//! each other's weights.

use serde::Serialize;

use sr_core::{EdgeId, EdgeKey};

use crate::OracleError;

/// An edge that received the conservative weight instead of a model score.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Degradation {
    pub edge:  EdgeKey,
    pub cause: OracleError,
}

/// Risk score and risk weight for every edge of one graph snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RiskOverlay {
    pub(crate) risk_score:   Vec<f64>,
    pub(crate) risk_weight:  Vec<f64>,
    pub(crate) degradations: Vec<Degradation>,
}

impl RiskOverlay {
    /// Clamped oracle score in `[0, 1]`; `1.0` for degraded edges.
    #[inline]
    pub fn risk_score(&self, edge: EdgeId) -> f64 {
        self.risk_score[edge.index()]
    }

    /// Cost used by the safe-route search.  Always `>= length`.
    #[inline]
    pub fn risk_weight(&self, edge: EdgeId) -> f64 {
        self.risk_weight[edge.index()]
    }

    /// Number of edges covered.  Equals the graph's edge count.
    pub fn len(&self) -> usize {
        self.risk_weight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.risk_weight.is_empty()
    }

    /// Edges that fell back to the conservative weight, in `EdgeId` order.
    pub fn degradations(&self) -> &[Degradation] {
        &self.degradations
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}
