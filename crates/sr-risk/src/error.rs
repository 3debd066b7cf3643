use serde::Serialize;
use thiserror::Error;

/// Why the risk oracle could not score an edge.
///
/// Every variant is a degradation, never a request failure: the attacher
/// substitutes the conservative weight and carries on.
#[derive(Clone, Debug, PartialEq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum OracleError {
    #[error("risk oracle unavailable: {0}")]
    Unavailable(String),

    #[error("risk oracle returned a non-numeric value ({0})")]
    NonNumeric(f64),

    #[error("risk scoring budget exhausted before this edge was scored")]
    TimedOut,
}

pub type OracleResult<T> = Result<T, OracleError>;
