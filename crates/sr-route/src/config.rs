//! Engine configuration.

use std::io::Read;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use sr_risk::RiskPolicy;

use crate::{RouteError, RouteResult};

/// Tunables for a [`RoutingEngine`](crate::RoutingEngine).
///
/// Every field has a default, so `{}` is a valid JSON config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Wall-clock budget for the risk oracle per request, in milliseconds.
    /// `0` disables the budget.
    pub oracle_timeout_ms: u64,

    /// Weight multiplier for blocked contexts and degraded edges.
    pub blocked_penalty: f64,

    /// `k` in `length · (1 + k · risk)`.
    pub risk_multiplier: f64,

    /// Run the fast and safe searches concurrently.  Only effective with
    /// the `parallel` feature.
    pub parallel_search: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let policy = RiskPolicy::default();
        Self {
            oracle_timeout_ms: 2_000,
            blocked_penalty:   policy.blocked_penalty,
            risk_multiplier:   policy.risk_multiplier,
            parallel_search:   true,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_reader<R: Read>(reader: R) -> RouteResult<Self> {
        let config: Self = serde_json::from_reader(reader)
            .map_err(|e| RouteError::Config(format!("invalid JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> RouteResult<Self> {
        Self::from_json_reader(s.as_bytes())
    }

    pub fn validate(&self) -> RouteResult<()> {
        self.policy().validate().map_err(RouteError::Config)
    }

    pub fn policy(&self) -> RiskPolicy {
        RiskPolicy {
            blocked_penalty: self.blocked_penalty,
            risk_multiplier: self.risk_multiplier,
        }
    }

    pub fn oracle_budget(&self) -> Option<Duration> {
        (self.oracle_timeout_ms > 0).then(|| Duration::from_millis(self.oracle_timeout_ms))
    }
}
