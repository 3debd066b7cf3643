//! Request and response types at the engine boundary.

use serde::{Deserialize, Serialize};

use sr_core::{ContextInput, GeoPoint};

use crate::{RouteError, RouteStats, SerializedRoute};

// ── RouteRequest ──────────────────────────────────────────────────────────────

/// One routing request, in the flat shape the transport layer receives.
///
/// ```json
/// { "start_lat": 28.61, "start_lng": 77.20,
///   "end_lat": 28.63, "end_lng": 77.22,
///   "context": { "water_depth": 35, "blocked": 0 } }
/// ```
///
/// `context` may be omitted or partial; missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start_lat: f64,
    pub start_lng: f64,
    pub end_lat:   f64,
    pub end_lng:   f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context:   Option<ContextInput>,
}

impl RouteRequest {
    pub fn new(start: GeoPoint, end: GeoPoint) -> Self {
        Self {
            start_lat: start.lat,
            start_lng: start.lng,
            end_lat:   end.lat,
            end_lng:   end.lng,
            context:   None,
        }
    }

    pub fn with_context(mut self, context: ContextInput) -> Self {
        self.context = Some(context);
        self
    }

    pub fn start(&self) -> GeoPoint {
        GeoPoint::new(self.start_lat, self.start_lng)
    }

    pub fn end(&self) -> GeoPoint {
        GeoPoint::new(self.end_lat, self.end_lng)
    }
}

// ── RouteResponse ─────────────────────────────────────────────────────────────

/// One variant's entry in a response: the coordinates, or an explicit
/// error marker.  Never a silently empty route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteOutcome {
    Route(SerializedRoute),
    Failed { error: String, message: String },
}

impl RouteOutcome {
    pub fn failed(err: &RouteError) -> Self {
        RouteOutcome::Failed { error: err.kind().to_string(), message: err.to_string() }
    }

    pub fn route(&self) -> Option<&SerializedRoute> {
        match self {
            RouteOutcome::Route(r) => Some(r),
            RouteOutcome::Failed { .. } => None,
        }
    }

    pub fn is_route(&self) -> bool {
        matches!(self, RouteOutcome::Route(_))
    }
}

/// Response body for one request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    pub fast_route:     RouteOutcome,
    pub safe_route:     RouteOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_stats:     Option<RouteStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_stats:     Option<RouteStats>,
    /// Edges whose risk fell back to the conservative weight.
    #[serde(default)]
    pub degraded_edges: usize,
}
