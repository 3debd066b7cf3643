//! `sr-risk` — risk scoring and per-request risk weight overlays.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`features`]  | `FeatureVector`, `FEATURE_NAMES`                          |
//! | [`oracle`]    | `RiskOracle` trait, `ConstantRisk`                        |
//! | [`heuristic`] | `HeuristicRiskModel`, the rule-based default oracle       |
//! | [`attach`]    | `RiskAttacher`, `RiskPolicy`                              |
//! | [`overlay`]   | `RiskOverlay`, `Degradation`                              |
//! | [`error`]     | `OracleError`, `OracleResult<T>`                          |
//!
//! # Design notes
//!
//! The road graph is shared and immutable; risk is per request.  The
//! attacher therefore never writes into the graph.  It produces a
//! [`RiskOverlay`] indexed by `EdgeId` that the safe-route search reads
//! alongside the graph and that is dropped with the request.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                      |
//! |------------|---------------------------------------------|
//! | `parallel` | Scores edges on Rayon's thread pool.        |

pub mod attach;
pub mod error;
pub mod features;
pub mod heuristic;
pub mod oracle;
pub mod overlay;


pub use attach::{MAX_POLICY_FACTOR, RiskAttacher, RiskPolicy};
pub use error::{OracleError, OracleResult};
pub use features::{FEATURE_NAMES, FeatureVector};
pub use heuristic::HeuristicRiskModel;
pub use oracle::{ConstantRisk, RiskOracle};
pub use overlay::{Degradation, RiskOverlay};
