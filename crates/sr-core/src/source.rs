//! Context acquisition strategies.
//!
//! The engine only consults a [`ContextSource`] when the caller sends no
//! context of its own.  Caller-supplied values always win.
//!
//! # Determinism
//!
//! [`SyntheticContextSource`] draws from a `SmallRng` seeded once at
//! construction, so a given seed always yields the same sequence of
//! contexts.  The RNG sits behind a `Mutex` because sources are shared
//! across request threads; draws are a handful of floats, so contention is
//! negligible next to the oracle pass.

use std::sync::Mutex;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::Context;

/// Supplies a context for requests that did not bring one.
pub trait ContextSource: Send + Sync {
    fn current_context(&self) -> Context;
}

// ── FixedContextSource ────────────────────────────────────────────────────────

/// Always returns the same context.  Useful for replaying a recorded
/// scenario or pinning tests.
#[derive(Clone, Debug, Default)]
pub struct FixedContextSource(pub Context);

impl ContextSource for FixedContextSource {
    fn current_context(&self) -> Context {
        self.0.clone()
    }
}

// ── SyntheticContextSource ────────────────────────────────────────────────────

/// Generates plausible live conditions for demos and load tests.
///
/// | Field           | Distribution            |
/// |-----------------|-------------------------|
/// | `elevation`     | uniform 180–300 m       |
/// | `flood_reports` | integer 0–15            |
/// | `traffic_speed` | uniform 5–60 km/h       |
/// | `water_depth`   | uniform 0–120 cm        |
/// | `road_width`    | uniform 3–12 m          |
/// | `visibility`    | uniform 0.2–1           |
/// | `crowd_density` | uniform 0–1             |
/// | `is_bridge`     | 50 %                    |
/// | `near_river`    | 50 %                    |
/// | `blocked`       | 10 %                    |
pub struct SyntheticContextSource {
    rng: Mutex<SmallRng>,
}

impl SyntheticContextSource {
    pub fn new(seed: u64) -> Self {
        Self { rng: Mutex::new(SmallRng::seed_from_u64(seed)) }
    }

    fn draw(rng: &mut SmallRng) -> Context {
        Context {
            elevation:     rng.gen_range(180.0..=300.0),
            flood_reports: rng.gen_range(0u32..=15) as f64,
            traffic_speed: rng.gen_range(5.0..=60.0),
            water_depth:   rng.gen_range(0.0..=120.0),
            road_width:    rng.gen_range(3.0..=12.0),
            visibility:    rng.gen_range(0.2..=1.0),
            crowd_density: rng.gen_range(0.0..=1.0),
            is_bridge:     rng.gen_bool(0.5),
            near_river:    rng.gen_bool(0.5),
            blocked:       rng.gen_bool(0.1),
        }
    }
}

impl ContextSource for SyntheticContextSource {
    fn current_context(&self) -> Context {
        // A poisoned lock only means another thread panicked mid-draw; the
        // RNG state is still a valid RNG state.
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Self::draw(&mut rng)
    }
}
