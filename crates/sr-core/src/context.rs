//! Per-request environmental context.
//!
//! A [`Context`] is built fresh for every routing request, never mutated, and
//! dropped when the request completes.  Callers usually send a partially
//! filled [`ContextInput`]; [`ContextInput::resolve`] applies the documented
//! defaults and rejects malformed values before anything reaches the risk
//! attacher.

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

// ── Defaults ──────────────────────────────────────────────────────────────────

pub const DEFAULT_ELEVATION:     f64 = 0.0;
pub const DEFAULT_FLOOD_REPORTS: f64 = 0.0;
pub const DEFAULT_TRAFFIC_SPEED: f64 = 30.0;
pub const DEFAULT_WATER_DEPTH:   f64 = 0.0;
pub const DEFAULT_ROAD_WIDTH:    f64 = 5.0;
pub const DEFAULT_VISIBILITY:    f64 = 1.0;
pub const DEFAULT_CROWD_DENSITY: f64 = 0.0;

// ── Context ───────────────────────────────────────────────────────────────────

/// Immutable bundle of live signals valid for one routing request.
///
/// All numeric fields are non-negative.  `visibility` and `crowd_density` are
/// fractions in `[0, 1]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Metres above sea level.
    pub elevation:     f64,
    /// Number of flood reports in the area.
    pub flood_reports: f64,
    /// Observed traffic speed, km/h.
    pub traffic_speed: f64,
    /// Standing water depth, cm.
    pub water_depth:   f64,
    /// Carriageway width, metres.
    pub road_width:    f64,
    pub visibility:    f64,
    pub crowd_density: f64,
    pub is_bridge:     bool,
    pub near_river:    bool,
    /// The area is closed to traffic.
    pub blocked:       bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            elevation:     DEFAULT_ELEVATION,
            flood_reports: DEFAULT_FLOOD_REPORTS,
            traffic_speed: DEFAULT_TRAFFIC_SPEED,
            water_depth:   DEFAULT_WATER_DEPTH,
            road_width:    DEFAULT_ROAD_WIDTH,
            visibility:    DEFAULT_VISIBILITY,
            crowd_density: DEFAULT_CROWD_DENSITY,
            is_bridge:     false,
            near_river:    false,
            blocked:       false,
        }
    }
}

impl Context {
    /// Check every numeric field against its allowed range.
    pub fn validate(&self) -> CoreResult<()> {
        let fields = [
            ("elevation",     self.elevation),
            ("flood_reports", self.flood_reports),
            ("traffic_speed", self.traffic_speed),
            ("water_depth",   self.water_depth),
            ("road_width",    self.road_width),
        ];
        for (field, value) in fields {
            non_negative(field, value)?;
        }
        fraction("visibility", self.visibility)?;
        fraction("crowd_density", self.crowd_density)?;
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> CoreResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidContext {
            field,
            reason: format!("expected a finite non-negative number, got {value}"),
        })
    }
}

fn fraction(field: &'static str, value: f64) -> CoreResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::InvalidContext {
            field,
            reason: format!("expected a fraction in [0, 1], got {value}"),
        })
    }
}

// ── ContextInput ──────────────────────────────────────────────────────────────

/// Boolean flag as sent over the wire: either a JSON bool or `0`/`1`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Number(f64),
}

impl Flag {
    fn resolve(self, field: &'static str) -> CoreResult<bool> {
        match self {
            Flag::Bool(b) => Ok(b),
            Flag::Number(n) if n == 0.0 => Ok(false),
            Flag::Number(n) if n == 1.0 => Ok(true),
            Flag::Number(n) => Err(CoreError::InvalidContext {
                field,
                reason: format!("expected a boolean or 0/1, got {n}"),
            }),
        }
    }
}

impl From<bool> for Flag {
    fn from(b: bool) -> Self {
        Flag::Bool(b)
    }
}

/// Partially specified context as received from the transport layer.
///
/// Every field is optional; absent fields take the defaults listed on
/// [`Context::default`].  Unknown keys are ignored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextInput {
    pub elevation:     Option<f64>,
    pub flood_reports: Option<f64>,
    pub traffic_speed: Option<f64>,
    pub water_depth:   Option<f64>,
    pub road_width:    Option<f64>,
    pub visibility:    Option<f64>,
    pub crowd_density: Option<f64>,
    pub is_bridge:     Option<Flag>,
    pub near_river:    Option<Flag>,
    pub blocked:       Option<Flag>,
}

impl ContextInput {
    /// Fill defaults and validate.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidContext`] naming the first offending field.
    pub fn resolve(&self) -> CoreResult<Context> {
        let d = Context::default();
        let flag = |v: Option<Flag>, field| v.map_or(Ok(false), |f| f.resolve(field));

        let ctx = Context {
            elevation:     self.elevation.unwrap_or(d.elevation),
            flood_reports: self.flood_reports.unwrap_or(d.flood_reports),
            traffic_speed: self.traffic_speed.unwrap_or(d.traffic_speed),
            water_depth:   self.water_depth.unwrap_or(d.water_depth),
            road_width:    self.road_width.unwrap_or(d.road_width),
            visibility:    self.visibility.unwrap_or(d.visibility),
            crowd_density: self.crowd_density.unwrap_or(d.crowd_density),
            is_bridge:     flag(self.is_bridge, "is_bridge")?,
            near_river:    flag(self.near_river, "near_river")?,
            blocked:       flag(self.blocked, "blocked")?,
        };
        ctx.validate()?;
        Ok(ctx)
    }
}

impl From<&Context> for ContextInput {
    fn from(ctx: &Context) -> Self {
        Self {
            elevation:     Some(ctx.elevation),
            flood_reports: Some(ctx.flood_reports),
            traffic_speed: Some(ctx.traffic_speed),
            water_depth:   Some(ctx.water_depth),
            road_width:    Some(ctx.road_width),
            visibility:    Some(ctx.visibility),
            crowd_density: Some(ctx.crowd_density),
            is_bridge:     Some(ctx.is_bridge.into()),
            near_river:    Some(ctx.near_river.into()),
            blocked:       Some(ctx.blocked.into()),
        }
    }
}
