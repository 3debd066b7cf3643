//! Built-in rule-based risk model.
//!
//! This is the labelling rule the learned model is trained to approximate,
//! minus the rainfall term (the live context carries no rainfall).  It is a
//! sound default when no trained model is deployed and a deterministic
//! oracle for tests.

use crate::{FeatureVector, OracleResult, RiskOracle};

/// Elevation below which an area counts as low-lying, metres.
pub const LOW_LYING_ELEVATION_M: f64 = 220.0;

const MAX_FLOOD_REPORTS: f64 = 15.0;
const MAX_WATER_DEPTH_CM: f64 = 120.0;
const FREE_FLOW_SPEED: f64 = 60.0;

/// Weighted sum of normalised hazard signals.
///
/// ```text
/// blocked                → 1.0
/// otherwise  0.20 · flood_reports / 15
///          + 0.20 · water_depth / 120
///          + 0.15 · (1 − traffic_speed / 60)
///          + 0.10 · crowd_density
///          + 0.05 · is_bridge
///          + 0.05 · [elevation < 220]
/// ```
///
/// Each ratio is clamped to `[0, 1]` before weighting.
#[derive(Copy, Clone, Debug, Default)]
pub struct HeuristicRiskModel;

#[inline]
fn ratio(value: f64, max: f64) -> f64 {
    (value / max).clamp(0.0, 1.0)
}

impl RiskOracle for HeuristicRiskModel {
    fn predict(&self, f: &FeatureVector) -> OracleResult<f64> {
        if f.blocked >= 0.5 {
            return Ok(1.0);
        }
        let low_lying = if f.elevation < LOW_LYING_ELEVATION_M { 1.0 } else { 0.0 };

        let risk = 0.20 * ratio(f.flood_reports, MAX_FLOOD_REPORTS)
            + 0.20 * ratio(f.water_depth, MAX_WATER_DEPTH_CM)
            + 0.15 * (1.0 - ratio(f.traffic_speed, FREE_FLOW_SPEED))
            + 0.10 * f.crowd_density.clamp(0.0, 1.0)
            + 0.05 * f.is_bridge
            + 0.05 * low_lying;

        Ok(risk.clamp(0.0, 1.0))
    }
}
