//! The `RiskOracle` trait: how the engine calls the learned risk model.

use crate::{FeatureVector, OracleResult};

/// Scores one edge under one context.
///
/// Implementations wrap whatever model backs the deployment (an ONNX
/// session, a remote inference endpoint, the built-in
/// [`HeuristicRiskModel`](crate::HeuristicRiskModel)).  The engine treats
/// the oracle as a pure function: equal inputs must give equal outputs, and
/// `predict` must not have side effects the engine can observe.
///
/// # Contract
///
/// - Return a risk probability, nominally in `[0, 1]`.  The attacher clamps
///   finite values into range and treats non-finite ones as
///   [`OracleError::NonNumeric`](crate::OracleError::NonNumeric).
/// - Return `Err` when the model cannot answer.  The edge then receives the
///   conservative weight; the request still completes.
///
/// # Thread safety
///
/// The oracle handle is shared across requests and, with the `parallel`
/// feature, across Rayon workers, so implementations must be `Send + Sync`.
///
/// Closures of the right shape implement the trait, which keeps test doubles
/// short:
///
/// ```
/// use sr_risk::{FeatureVector, OracleResult, RiskOracle};
///
/// let by_length = |f: &FeatureVector| -> OracleResult<f64> { Ok((f.length / 1_000.0).min(1.0)) };
/// # let _: &dyn RiskOracle = &by_length;
/// ```
pub trait RiskOracle: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> OracleResult<f64>;
}

impl<F> RiskOracle for F
where
    F: Fn(&FeatureVector) -> OracleResult<f64> + Send + Sync,
{
    #[inline]
    fn predict(&self, features: &FeatureVector) -> OracleResult<f64> {
        self(features)
    }
}

/// An oracle that returns the same risk for every edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConstantRisk(pub f64);

impl RiskOracle for ConstantRisk {
    fn predict(&self, _features: &FeatureVector) -> OracleResult<f64> {
        Ok(self.0)
    }
}
