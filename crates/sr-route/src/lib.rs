//! `sr-route` — dual fast/safe routing over a shared road graph.
//!
//! # Crate layout
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`weight`]      | `EdgeWeight`, `LengthWeight`, `RiskWeight`, `RouteVariant` |
//! | [`dijkstra`]    | multigraph-aware, cancellable shortest-path search    |
//! | [`solver`]      | `DualPathSolver`, `PathResult`, `RouteStats`          |
//! | [`materialize`] | `SerializedRoute`, node path → coordinates            |
//! | [`engine`]      | `RoutingEngine`: one request end to end               |
//! | [`request`]     | `RouteRequest`, `RouteResponse`, `RouteOutcome`       |
//! | [`config`]      | `EngineConfig`                                        |
//! | [`cancel`]      | `CancelToken`                                         |
//! | [`error`]       | `RouteError`, `RouteResult<T>`                        |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | Fast and safe searches run under `rayon::join`; edge scoring uses Rayon too. |

pub mod cancel;
pub mod config;
pub mod dijkstra;
pub mod engine;
pub mod error;
pub mod materialize;
pub mod request;
pub mod solver;
pub mod weight;

#[cfg(test)]
mod tests;

pub use cancel::CancelToken;
pub use config::EngineConfig;
pub use dijkstra::{Path, shortest_path};
pub use engine::{DualRoute, MaterializedRoute, RoutingEngine};
pub use error::{RouteError, RouteResult};
pub use materialize::{SerializedRoute, materialize};
pub use request::{RouteOutcome, RouteRequest, RouteResponse};
pub use solver::{DualPathSolver, DualPaths, PathResult, RouteStats};
pub use weight::{EdgeWeight, LengthWeight, RiskWeight, RouteVariant};
