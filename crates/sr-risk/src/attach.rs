//! Risk weight attachment.
//!
//! One pass over every edge of the graph:
//!
//! ```text
//! features = FeatureVector(edge, ctx)
//! risk     = clamp(oracle.predict(features), 0, 1)
//! weight   = length · blocked_penalty            if ctx.blocked
//!          = length · (1 + risk_multiplier · risk) otherwise
//! ```
//!
//! When the oracle errors, returns a non-finite value, or the scoring budget
//! runs out, the edge gets `risk = 1` and `weight = length · blocked_penalty`
//! and a [`Degradation`] is recorded.  Attachment itself never fails.
//!
//! # Budget
//!
//! Oracle calls may block on inference.  With a budget, scoring runs on a
//! worker thread that streams per-edge results back over a channel; the
//! caller waits on that channel until the deadline and then stops.  Edges
//! without a result by then take the conservative weight.  A call that
//! never returns only pins its worker, never the request.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use sr_core::Context;
use sr_graph::RoadGraph;

use crate::{Degradation, FeatureVector, OracleError, RiskOracle, RiskOverlay};

// ── RiskPolicy ────────────────────────────────────────────────────────────────

/// Cap on both policy factors.  With edge lengths capped by the graph
/// builder, a path summed over every edge of any `u32`-indexed graph stays
/// far below `f64::MAX`.
pub const MAX_POLICY_FACTOR: f64 = 1.0e12;

/// Constants of the weight formula.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    /// Multiplier applied to `length` for blocked contexts and degraded
    /// edges.  Large enough to be avoided whenever any alternative exists,
    /// yet finite so a fully blocked graph still yields a path.
    pub blocked_penalty: f64,

    /// `k` in `length · (1 + k · risk)`.
    pub risk_multiplier: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self { blocked_penalty: 1_000.0, risk_multiplier: 3.0 }
    }
}

impl RiskPolicy {
    /// Weight of an edge with a valid score.
    #[inline]
    pub fn weight(&self, length_m: f64, risk: f64, blocked: bool) -> f64 {
        if blocked {
            self.conservative_weight(length_m)
        } else {
            length_m * (1.0 + self.risk_multiplier * risk)
        }
    }

    /// Weight of an edge the oracle could not score.
    #[inline]
    pub fn conservative_weight(&self, length_m: f64) -> f64 {
        length_m * self.blocked_penalty
    }

    /// Every weight stays `>= length` only if the penalty is at least 1 and
    /// the multiplier is non-negative; both are capped at
    /// [`MAX_POLICY_FACTOR`] so path costs cannot overflow.
    pub fn validate(&self) -> Result<(), String> {
        if !(1.0..=MAX_POLICY_FACTOR).contains(&self.blocked_penalty) {
            return Err(format!(
                "blocked_penalty must be in [1, {MAX_POLICY_FACTOR}], got {}",
                self.blocked_penalty
            ));
        }
        if !(0.0..=MAX_POLICY_FACTOR).contains(&self.risk_multiplier) {
            return Err(format!(
                "risk_multiplier must be in [0, {MAX_POLICY_FACTOR}], got {}",
                self.risk_multiplier
            ));
        }
        Ok(())
    }
}

// ── RiskAttacher ──────────────────────────────────────────────────────────────

/// Outcome of scoring a single edge.
enum EdgeScore {
    Scored(f64),
    Degraded(OracleError),
}

fn score(oracle: &dyn RiskOracle, features: &FeatureVector) -> EdgeScore {
    match oracle.predict(features) {
        Ok(risk) if risk.is_finite() => EdgeScore::Scored(risk.clamp(0.0, 1.0)),
        Ok(risk) => EdgeScore::Degraded(OracleError::NonNumeric(risk)),
        Err(e) => EdgeScore::Degraded(e),
    }
}

/// Builds a [`RiskOverlay`] for one graph and one context.
///
/// The oracle handle is shared so a budgeted pass can hand it to a worker
/// that may outlive [`attach`](Self::attach).
///
/// ```rust,ignore
/// let overlay = RiskAttacher::new(Arc::new(HeuristicRiskModel))
///     .with_budget(Duration::from_secs(2))
///     .attach(&graph, &ctx);
/// ```
pub struct RiskAttacher {
    oracle: Arc<dyn RiskOracle>,
    policy: RiskPolicy,
    budget: Option<Duration>,
}

impl RiskAttacher {
    /// Default policy, no budget.
    pub fn new(oracle: Arc<dyn RiskOracle>) -> Self {
        Self { oracle, policy: RiskPolicy::default(), budget: None }
    }

    pub fn with_policy(mut self, policy: RiskPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bound the wall-clock time spent waiting on the oracle.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    /// Score every edge of `graph` exactly once under `ctx`.
    ///
    /// Deterministic for a deterministic oracle that answers within the
    /// budget: attaching twice with the same context gives identical
    /// overlays.  Returns by the deadline even if the oracle hangs.
    pub fn attach(&self, graph: &RoadGraph, ctx: &Context) -> RiskOverlay {
        let deadline = self.budget.map(|b| Instant::now() + b);

        let features: Vec<FeatureVector> =
            graph.edges().map(|edge| FeatureVector::for_edge(graph, edge, ctx)).collect();
        let scores = match deadline {
            Some(deadline) => self.score_within(features, deadline),
            None => score_all(&*self.oracle, &features),
        };

        let n = graph.edge_count();
        let mut overlay = RiskOverlay {
            risk_score:   Vec::with_capacity(n),
            risk_weight:  Vec::with_capacity(n),
            degradations: Vec::new(),
        };
        let mut timed_out = 0usize;

        for (edge, score) in graph.edges().zip(scores) {
            let length = graph.edge_length_m[edge.index()];
            match score {
                EdgeScore::Scored(risk) => {
                    overlay.risk_score.push(risk);
                    overlay.risk_weight.push(self.policy.weight(length, risk, ctx.blocked));
                }
                EdgeScore::Degraded(cause) => {
                    match &cause {
                        OracleError::TimedOut => timed_out += 1,
                        other => warn!("edge {}: {other}; using conservative weight", graph.edge_key(edge)),
                    }
                    overlay.risk_score.push(1.0);
                    overlay.risk_weight.push(self.policy.conservative_weight(length));
                    overlay.degradations.push(Degradation { edge: graph.edge_key(edge), cause });
                }
            }
        }

        if timed_out > 0 {
            warn!(
                "risk scoring budget exhausted: {timed_out} of {n} edges given the conservative weight"
            );
        }
        debug!(
            "attached risk weights to {n} edges ({} degraded, blocked = {})",
            overlay.degradations.len(),
            ctx.blocked
        );
        overlay
    }

    /// Score on a worker thread, collecting whatever arrives before
    /// `deadline`.  Missing edges come back as `TimedOut`.
    fn score_within(&self, features: Vec<FeatureVector>, deadline: Instant) -> Vec<EdgeScore> {
        let features: Arc<[FeatureVector]> = features.into();
        let n = features.len();
        if n == 0 || Instant::now() >= deadline {
            return (0..n).map(|_| EdgeScore::Degraded(OracleError::TimedOut)).collect();
        }
        let mut scores: Vec<Option<EdgeScore>> = (0..n).map(|_| None).collect();

        let (tx, rx) = mpsc::channel::<(usize, EdgeScore)>();
        let stop = Arc::new(AtomicBool::new(false));
        let oracle = Arc::clone(&self.oracle);
        let worker_stop = Arc::clone(&stop);
        let worker_features = Arc::clone(&features);

        let spawned = thread::Builder::new()
            .name("risk-scoring".into())
            .spawn(move || stream_scores(&*oracle, &worker_features, &worker_stop, tx));
        if let Err(e) = spawned {
            warn!("could not start risk scoring worker ({e}); scoring on the caller's thread");
            return score_all(&*self.oracle, &features);
        }

        let mut received = 0usize;
        while received < n {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            match rx.recv_timeout(deadline - now) {
                Ok((i, score)) => {
                    scores[i] = Some(score);
                    received += 1;
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("risk scoring worker stopped after {received} of {n} edges");
                    break;
                }
            }
        }
        stop.store(true, Ordering::Relaxed);

        scores
            .into_iter()
            .map(|s| s.unwrap_or_else(|| EdgeScore::Degraded(OracleError::TimedOut)))
            .collect()
    }
}

fn score_all(oracle: &dyn RiskOracle, features: &[FeatureVector]) -> Vec<EdgeScore> {
    #[cfg(feature = "parallel")]
    let scores = {
        use rayon::prelude::*;

        // Indexed parallel iterator: output order is EdgeId order.
        features.par_iter().map(|f| score(oracle, f)).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let scores = features.iter().map(|f| score(oracle, f)).collect();

    scores
}

/// Worker body for a budgeted pass.  Stops calling the oracle once `stop`
/// is raised or the receiver is gone.
#[cfg(not(feature = "parallel"))]
fn stream_scores(
    oracle:   &dyn RiskOracle,
    features: &[FeatureVector],
    stop:     &AtomicBool,
    tx:       mpsc::Sender<(usize, EdgeScore)>,
) {
    for (i, f) in features.iter().enumerate() {
        if stop.load(Ordering::Relaxed) || tx.send((i, score(oracle, f))).is_err() {
            break;
        }
    }
}

#[cfg(feature = "parallel")]
fn stream_scores(
    oracle:   &dyn RiskOracle,
    features: &[FeatureVector],
    stop:     &AtomicBool,
    tx:       mpsc::Sender<(usize, EdgeScore)>,
) {
    use rayon::prelude::*;

    features.par_iter().enumerate().for_each_with(tx, |tx, (i, f)| {
        if !stop.load(Ordering::Relaxed) {
            // A closed channel means the deadline passed; nothing to report.
            let _ = tx.send((i, score(oracle, f)));
        }
    });
}
